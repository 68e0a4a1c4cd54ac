// 该文件是 Shanan （山南西风） 项目的一部分。
// src/rpc.rs - 跨核/主机远程调用接口
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

use crate::proc_table::ProcEntry;

#[derive(Error, Debug)]
pub enum RpcError {
  #[error("远端过程不存在: {0}")]
  ProcNotFound(String),
  #[error("链路错误: {0}")]
  Link(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 远端过程句柄，初始化时解析一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcHandle(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
  /// 阻塞直到远端返回结果
  Sync,
  /// 发出调用后立即返回，不等待结果
  Async,
}

/// 像素核一侧的远程调用客户端
pub trait RemoteCore {
  fn get_proc(&mut self, name: &str) -> Result<ProcHandle, RpcError>;

  fn call_sync(&mut self, proc: ProcHandle, args: &[usize]) -> Result<i32, RpcError>;

  fn call_async(&mut self, proc: ProcHandle, args: &[usize]) -> Result<(), RpcError>;
}

/// 主机一侧的链路：注册过程表，并以原地缓冲区发送应答
pub trait HostLink {
  fn register_module(&mut self, procedures: &'static [ProcEntry]) -> Result<(), RpcError>;

  /// 直接引用共享缓冲区发送，不做额外拷贝
  fn use_buffer(&mut self, data: &[u8]) -> Result<(), RpcError>;
}
