// 该文件是 Shanan （山南西风） 项目的一部分。
// src/store.rs - 参数存储
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
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

/// 以字符串为键的持久化参数存储（闪存）。
pub trait ParamStore {
  /// 读取记录，不存在时返回 `None`
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

  /// 仅当记录不存在时添加，返回是否新建
  fn add(&mut self, key: &str, desc: &str, value: &[u8]) -> Result<bool, StoreError>;

  /// 覆盖写入记录
  fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

mod calibration;
mod json_file;
mod memory;

pub use self::calibration::{CalibrationStore, signature_key};
pub(crate) use self::calibration::validate_slot;
pub use self::json_file::JsonFileStore;
pub use self::memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("记录 {key} 长度错误: 期望 {expected} 字节，实际 {found} 字节")]
  SizeMismatch {
    key: String,
    expected: usize,
    found: usize,
  },
}

pub enum ParamStoreWrapper {
  Memory(MemoryStore),
  JsonFile(JsonFileStore),
}

impl FromUrl for ParamStoreWrapper {
  type Error = StoreError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      MemoryStore::SCHEME => Ok(ParamStoreWrapper::Memory(MemoryStore::from_url(url)?)),
      JsonFileStore::SCHEME => Ok(ParamStoreWrapper::JsonFile(JsonFileStore::from_url(url)?)),
      _ => Err(StoreError::SchemeMismatch),
    }
  }
}

impl ParamStore for ParamStoreWrapper {
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    match self {
      ParamStoreWrapper::Memory(store) => store.get(key),
      ParamStoreWrapper::JsonFile(store) => store.get(key),
    }
  }

  fn add(&mut self, key: &str, desc: &str, value: &[u8]) -> Result<bool, StoreError> {
    match self {
      ParamStoreWrapper::Memory(store) => store.add(key, desc, value),
      ParamStoreWrapper::JsonFile(store) => store.add(key, desc, value),
    }
  }

  fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
    match self {
      ParamStoreWrapper::Memory(store) => store.set(key, value),
      ParamStoreWrapper::JsonFile(store) => store.set(key, value),
    }
  }
}
