// 该文件是 Shanan （山南西风） 项目的一部分。
// src/link.rs - 主机链路实现
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

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  proc_table::ProcEntry,
  rpc::{HostLink, RpcError},
};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::DirectoryRecordLink;

#[derive(Error, Debug)]
pub enum LinkError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 丢弃所有应答，只记录字节数
#[derive(Debug, Default)]
pub struct NullLink {
  sent_bytes: u64,
}

impl NullLink {
  pub fn sent_bytes(&self) -> u64 {
    self.sent_bytes
  }
}

impl FromUrlWithScheme for NullLink {
  const SCHEME: &'static str = "null";
}

impl FromUrl for NullLink {
  type Error = LinkError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LinkError::SchemeMismatch);
    }
    Ok(NullLink::default())
  }
}

impl HostLink for NullLink {
  fn register_module(&mut self, procedures: &'static [ProcEntry]) -> Result<(), RpcError> {
    debug!("注册 {} 个过程", procedures.len());
    Ok(())
  }

  fn use_buffer(&mut self, data: &[u8]) -> Result<(), RpcError> {
    self.sent_bytes += data.len() as u64;
    Ok(())
  }
}

pub enum LinkWrapper {
  Null(NullLink),
  #[cfg(feature = "directory_record")]
  DirectoryRecord(DirectoryRecordLink),
}

impl FromUrl for LinkWrapper {
  type Error = LinkError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      NullLink::SCHEME => Ok(LinkWrapper::Null(NullLink::from_url(url)?)),
      #[cfg(feature = "directory_record")]
      DirectoryRecordLink::SCHEME => Ok(LinkWrapper::DirectoryRecord(
        DirectoryRecordLink::from_url(url)?,
      )),
      _ => Err(LinkError::SchemeMismatch),
    }
  }
}

impl HostLink for LinkWrapper {
  fn register_module(&mut self, procedures: &'static [ProcEntry]) -> Result<(), RpcError> {
    match self {
      LinkWrapper::Null(link) => link.register_module(procedures),
      #[cfg(feature = "directory_record")]
      LinkWrapper::DirectoryRecord(link) => link.register_module(procedures),
    }
  }

  fn use_buffer(&mut self, data: &[u8]) -> Result<(), RpcError> {
    match self {
      LinkWrapper::Null(link) => link.use_buffer(data),
      #[cfg(feature = "directory_record")]
      LinkWrapper::DirectoryRecord(link) => link.use_buffer(data),
    }
  }
}
