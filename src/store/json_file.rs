// 该文件是 Shanan （山南西风） 项目的一部分。
// src/store/json_file.rs - JSON 文件参数存储
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

use std::{
  fs::File,
  io::{BufReader, BufWriter, Write},
  path::{Path, PathBuf},
};

use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  store::{MemoryStore, ParamStore, StoreError},
};

/// 以 JSON 文件模拟闪存的参数存储。
///
/// 每次修改都会整体重写文件：先写临时文件，再重命名覆盖。
pub struct JsonFileStore {
  path: PathBuf,
  params: MemoryStore,
}

impl JsonFileStore {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    let params = if path.exists() {
      let reader = BufReader::new(File::open(&path)?);
      let params: MemoryStore = serde_json::from_reader(reader)?;
      info!("从 {} 加载 {} 条参数", path.display(), params.len());
      params
    } else {
      info!("参数文件 {} 不存在，使用空存储", path.display());
      MemoryStore::new()
    };

    Ok(Self { path, params })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn persist(&self) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent)?;
      }
    }
    let tmp = self.path.with_extension("tmp");
    {
      let mut writer = BufWriter::new(File::create(&tmp)?);
      serde_json::to_writer_pretty(&mut writer, &self.params)?;
      writer.flush()?;
    }
    std::fs::rename(&tmp, &self.path)?;
    debug!("参数已写入 {}", self.path.display());
    Ok(())
  }
}

impl FromUrlWithScheme for JsonFileStore {
  const SCHEME: &'static str = "flash";
}

impl FromUrl for JsonFileStore {
  type Error = StoreError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(StoreError::SchemeMismatch);
    }
    Self::open(url.path())
  }
}

impl ParamStore for JsonFileStore {
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    self.params.get(key)
  }

  fn add(&mut self, key: &str, desc: &str, value: &[u8]) -> Result<bool, StoreError> {
    let created = self.params.add(key, desc, value)?;
    if created {
      self.persist()?;
    }
    Ok(created)
  }

  fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
    self.params.set(key, value)?;
    self.persist()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");

    {
      let mut store = JsonFileStore::open(&path).unwrap();
      store.add("signature1", "Color signature 1", &[0; 4]).unwrap();
      store.set("signature1", &[1, 2, 3, 4]).unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.get("signature1").unwrap(), Some(vec![1, 2, 3, 4]));
  }

  #[test]
  fn from_url_requires_flash_scheme() {
    let url = Url::parse("memory://").unwrap();
    assert!(matches!(
      JsonFileStore::from_url(&url),
      Err(StoreError::SchemeMismatch)
    ));
  }
}
