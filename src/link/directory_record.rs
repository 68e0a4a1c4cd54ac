// 该文件是 Shanan （山南西风） 项目的一部分。
// src/link/directory_record.rs - 按日期目录记录线缆帧
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use chrono::{Datelike, Utc};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::{
  FromUrl, FromUrlWithScheme,
  link::LinkError,
  proc_table::ProcEntry,
  rpc::{HostLink, RpcError},
};

/// 把每一帧应答写成 `YYYY/MM/DD/HH-MM-SS-XXXX.bin`
pub struct DirectoryRecordLink {
  directory: PathBuf,
  frame_counter: u16,
  manifest: bool,
}

impl FromUrlWithScheme for DirectoryRecordLink {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordLink {
  type Error = LinkError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(LinkError::SchemeMismatch);
    }

    let manifest = uri.query_pairs().any(|(k, _)| k == "manifest");

    Ok(DirectoryRecordLink {
      directory: PathBuf::from(uri.path()),
      frame_counter: 0,
      manifest,
    })
  }
}

impl DirectoryRecordLink {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      frame_counter: 0,
      manifest: false,
    }
  }

  fn frame_id(&mut self) -> u16 {
    self.frame_counter = self.frame_counter.wrapping_add(1);
    self.frame_counter
  }

  fn frame_path(&mut self) -> Result<PathBuf, std::io::Error> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    let filename = format!("{}-{:04X}.bin", now.format("%H-%M-%S"), self.frame_id());
    Ok(directory.join(filename))
  }
}

impl HostLink for DirectoryRecordLink {
  fn register_module(&mut self, procedures: &'static [ProcEntry]) -> Result<(), RpcError> {
    info!("过程表已登记到 {}", self.directory.display());
    if self.manifest {
      std::fs::create_dir_all(&self.directory)?;
      let names: Vec<serde_json::Value> = procedures
        .iter()
        .map(|p| serde_json::json!({ "name": p.name, "doc": p.doc }))
        .collect();
      let text = serde_json::to_string_pretty(&names)
        .map_err(|err| RpcError::Link(err.to_string()))?;
      std::fs::write(self.directory.join("procedures.json"), text)?;
    }
    Ok(())
  }

  fn use_buffer(&mut self, data: &[u8]) -> Result<(), RpcError> {
    let path = self.frame_path()?;
    std::fs::write(&path, data)?;
    debug!("帧已写入 {} ({} 字节)", path.display(), data.len());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frames_land_in_dated_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut link = DirectoryRecordLink::new(dir.path());
    link.use_buffer(b"CCQ1").unwrap();
    link.use_buffer(b"CCB1").unwrap();

    let now = Utc::now();
    let day = dir
      .path()
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    let count = std::fs::read_dir(day).unwrap().count();
    assert_eq!(count, 2);
  }
}
