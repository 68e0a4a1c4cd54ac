// 该文件是 Shanan （山南西风） 项目的一部分。
// src/store/memory.rs - 内存参数存储
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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  store::{ParamStore, StoreError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Param {
  pub desc: String,
  pub value: Vec<u8>,
}

/// 掉电即失的参数存储，主要用于测试与演示
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
  params: BTreeMap<String, Param>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.params.len()
  }

  pub fn is_empty(&self) -> bool {
    self.params.is_empty()
  }

  pub fn description(&self, key: &str) -> Option<&str> {
    self.params.get(key).map(|p| p.desc.as_str())
  }
}

impl FromUrlWithScheme for MemoryStore {
  const SCHEME: &'static str = "memory";
}

impl FromUrl for MemoryStore {
  type Error = StoreError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(StoreError::SchemeMismatch);
    }
    Ok(Self::new())
  }
}

impl ParamStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(self.params.get(key).map(|p| p.value.clone()))
  }

  fn add(&mut self, key: &str, desc: &str, value: &[u8]) -> Result<bool, StoreError> {
    if self.params.contains_key(key) {
      return Ok(false);
    }
    self.params.insert(
      key.to_string(),
      Param {
        desc: desc.to_string(),
        value: value.to_vec(),
      },
    );
    Ok(true)
  }

  fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
    self
      .params
      .entry(key.to_string())
      .and_modify(|p| p.value = value.to_vec())
      .or_insert_with(|| Param {
        desc: String::new(),
        value: value.to_vec(),
      });
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_never_overwrites() {
    let mut store = MemoryStore::new();
    assert!(store.add("k", "first", &[1, 2]).unwrap());
    assert!(!store.add("k", "second", &[3, 4]).unwrap());
    assert_eq!(store.get("k").unwrap(), Some(vec![1, 2]));
    assert_eq!(store.description("k"), Some("first"));
  }

  #[test]
  fn set_keeps_description() {
    let mut store = MemoryStore::new();
    store.add("k", "desc", &[0]).unwrap();
    store.set("k", &[9]).unwrap();
    assert_eq!(store.get("k").unwrap(), Some(vec![9]));
    assert_eq!(store.description("k"), Some("desc"));
  }
}
