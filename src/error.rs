// 该文件是 Shanan （山南西风） 项目的一部分。
// src/error.rs - 错误定义与状态码
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

use crate::{rpc::RpcError, store::StoreError};

pub const STATUS_INVALID_ARGUMENT: i32 = -1;
pub const STATUS_NOT_FOUND: i32 = -2;
pub const STATUS_NO_INPUT: i32 = -3;
pub const STATUS_REMOTE_FAILURE: i32 = -4;
pub const STATUS_CAPACITY_EXCEEDED: i32 = -5;
pub const STATUS_STORE: i32 = -6;
pub const STATUS_RPC: i32 = -7;
pub const STATUS_ENGINE: i32 = -8;

#[derive(Error, Debug)]
pub enum CcError {
  #[error("参数无效: {0}")]
  InvalidArgument(String),
  #[error("参数存储中缺少记录: {0}")]
  NotFound(String),
  #[error("没有可用的原始帧")]
  NoInput,
  #[error("远端调用失败，状态码: {0}")]
  RemoteFailure(i32),
  #[error("输出缓冲区容量不足: 需要 {needed} 字节，剩余 {available} 字节")]
  CapacityExceeded { needed: usize, available: usize },
  #[error("色块引擎返回错误状态: {0}")]
  Engine(i32),
  #[error("参数存储错误: {0}")]
  Store(#[from] StoreError),
  #[error("RPC 错误: {0}")]
  Rpc(#[from] RpcError),
}

impl CcError {
  pub fn invalid_slot(slot: u8) -> Self {
    CcError::InvalidArgument(format!(
      "颜色签名编号 {} 超出范围 [1, {}]",
      slot,
      crate::NUM_MODELS
    ))
  }

  /// 映射为 RPC 返回的负数状态码
  pub fn status(&self) -> i32 {
    match self {
      CcError::InvalidArgument(_) => STATUS_INVALID_ARGUMENT,
      CcError::NotFound(_) => STATUS_NOT_FOUND,
      CcError::NoInput => STATUS_NO_INPUT,
      CcError::RemoteFailure(status) if *status < 0 => *status,
      CcError::RemoteFailure(_) => STATUS_REMOTE_FAILURE,
      CcError::CapacityExceeded { .. } => STATUS_CAPACITY_EXCEEDED,
      CcError::Engine(status) if *status < 0 => *status,
      CcError::Engine(_) => STATUS_ENGINE,
      CcError::Store(_) => STATUS_STORE,
      CcError::Rpc(_) => STATUS_RPC,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_are_negative() {
    let errors = [
      CcError::invalid_slot(0),
      CcError::NotFound("signature1".into()),
      CcError::NoInput,
      CcError::RemoteFailure(3),
      CcError::CapacityExceeded {
        needed: 8,
        available: 4,
      },
      CcError::Rpc(RpcError::Link("down".into())),
    ];
    for err in errors {
      assert!(err.status() < 0, "{err} -> {}", err.status());
    }
  }

  #[test]
  fn remote_and_engine_status_pass_through() {
    assert_eq!(CcError::RemoteFailure(-12).status(), -12);
    assert_eq!(CcError::Engine(-9).status(), -9);
  }

  #[test]
  fn non_negative_engine_status_is_not_a_score() {
    assert_eq!(CcError::Engine(0).status(), STATUS_ENGINE);
    assert_eq!(CcError::Engine(42).status(), STATUS_ENGINE);
  }
}
