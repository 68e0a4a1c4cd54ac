// 该文件是 Shanan （山南西风） 项目的一部分。
// src/store/calibration.rs - 颜色签名持久化
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

use tracing::{debug, info};

use crate::{
  NUM_MODELS,
  error::CcError,
  lut::{COLOR_MODEL_SIZE, ColorModel},
  store::{ParamStore, StoreError},
};

pub fn signature_key(slot: u8) -> String {
  format!("signature{}", slot)
}

fn signature_desc(slot: u8) -> String {
  format!("Color signature {}", slot)
}

pub(crate) fn validate_slot(slot: u8) -> Result<(), CcError> {
  if slot < 1 || slot > NUM_MODELS {
    return Err(CcError::invalid_slot(slot));
  }
  Ok(())
}

/// 参数存储之上的签名记录读写
pub struct CalibrationStore<S> {
  store: S,
}

impl<S: ParamStore> CalibrationStore<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  pub fn inner(&self) -> &S {
    &self.store
  }

  pub fn inner_mut(&mut self) -> &mut S {
    &mut self.store
  }

  pub fn into_inner(self) -> S {
    self.store
  }

  /// 为缺失的签名写入全零记录，已有记录保持不变；返回新建数量
  pub fn ensure_defaults(&mut self) -> Result<usize, CcError> {
    let default = ColorModel::default();
    let mut created = 0;
    for slot in 1..=NUM_MODELS {
      if self
        .store
        .add(&signature_key(slot), &signature_desc(slot), default.as_bytes())?
      {
        debug!("创建默认签名 {}", slot);
        created += 1;
      }
    }
    if created > 0 {
      info!("已创建 {} 个默认签名记录", created);
    }
    Ok(created)
  }

  pub fn read(&self, slot: u8) -> Result<ColorModel, CcError> {
    validate_slot(slot)?;
    let key = signature_key(slot);
    let bytes = self
      .store
      .get(&key)?
      .ok_or_else(|| CcError::NotFound(key.clone()))?;
    ColorModel::from_bytes(&bytes).ok_or_else(|| {
      CcError::Store(StoreError::SizeMismatch {
        key,
        expected: COLOR_MODEL_SIZE,
        found: bytes.len(),
      })
    })
  }

  /// 按编号顺序读出全部签名，任一缺失即中止
  pub fn read_all<F>(&self, mut on_each: F) -> Result<(), CcError>
  where
    F: FnMut(u8, ColorModel),
  {
    for slot in 1..=NUM_MODELS {
      let model = self.read(slot)?;
      on_each(slot, model);
    }
    Ok(())
  }

  pub fn write(&mut self, slot: u8, model: &ColorModel) -> Result<(), CcError> {
    validate_slot(slot)?;
    self.store.set(&signature_key(slot), model.as_bytes())?;
    debug!("签名 {} 已写入存储", slot);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  #[test]
  fn keys_follow_slot_index() {
    assert_eq!(signature_key(1), "signature1");
    assert_eq!(signature_key(7), "signature7");
  }

  #[test]
  fn write_rejects_out_of_range() {
    let mut store = CalibrationStore::new(MemoryStore::new());
    let model = ColorModel::default();
    assert!(matches!(
      store.write(0, &model),
      Err(CcError::InvalidArgument(_))
    ));
    assert!(matches!(
      store.write(NUM_MODELS + 1, &model),
      Err(CcError::InvalidArgument(_))
    ));
    assert!(store.inner().is_empty());
  }

  #[test]
  fn read_reports_short_record() {
    let mut store = CalibrationStore::new(MemoryStore::new());
    store.inner_mut().set("signature2", &[1, 2, 3]).unwrap();
    assert!(matches!(
      store.read(2),
      Err(CcError::Store(StoreError::SizeMismatch { found: 3, .. }))
    ));
  }
}
