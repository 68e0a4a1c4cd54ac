// 该文件是 Shanan （山南西风） 项目的一部分。
// src/acquire.rs - 跨核游程帧获取
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
use tracing::{debug, error, info, warn};

use crate::{
  context::CcContext,
  error::CcError,
  lut::LutLoader,
  rpc::{CallMode, ProcHandle, RemoteCore},
  store::{CalibrationStore, ParamStore},
};

/// 像素核上的取帧过程名
pub const GET_RLS_FRAME_PROC: &str = "getRLSFrame";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
  /// 原始 Bayer 输出
  Raw,
  /// 支持颜色分割的采集模式
  Segmentation,
}

#[derive(Error, Debug)]
#[error("相机模式切换失败，状态码: {0}")]
pub struct CameraError(pub i32);

pub trait Camera {
  fn set_mode(&mut self, mode: CameraMode) -> Result<(), CameraError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
  Idle,
  /// 异步取帧已发出，分段尚未读出
  Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
  /// 同步调用完成，携带像素核的返回值
  Completed(i32),
  Pending,
}

pub struct Acquisition<R, C> {
  remote: R,
  camera: C,
  proc: ProcHandle,
  state: AcquisitionState,
}

impl<R: RemoteCore, C: Camera> Acquisition<R, C> {
  /// 解析像素核的取帧过程句柄
  pub fn bind(mut remote: R, camera: C) -> Result<Self, CcError> {
    let proc = remote.get_proc(GET_RLS_FRAME_PROC).map_err(|err| {
      error!("无法解析像素核过程 {}: {}", GET_RLS_FRAME_PROC, err);
      err
    })?;
    info!("像素核过程 {} 句柄: {:?}", GET_RLS_FRAME_PROC, proc);
    Ok(Self {
      remote,
      camera,
      proc,
      state: AcquisitionState::Idle,
    })
  }

  pub fn state(&self) -> AcquisitionState {
    self.state
  }

  pub fn remote(&self) -> &R {
    &self.remote
  }

  pub fn remote_mut(&mut self) -> &mut R {
    &mut self.remote
  }

  pub fn camera(&self) -> &C {
    &self.camera
  }

  /// 分段读出后回到空闲，返回之前是否处于等待状态
  pub fn complete(&mut self) -> bool {
    let was_pending = self.state == AcquisitionState::Pending;
    self.state = AcquisitionState::Idle;
    was_pending
  }

  /// 请求像素核生成一帧游程分段。
  ///
  /// 顺序固定：按需重建查找表，清空分段队列，切换相机模式，最后调用像素核。
  pub fn fetch<S: ParamStore>(
    &mut self,
    ctx: &mut CcContext,
    store: &CalibrationStore<S>,
    output_addr: usize,
    mode: CallMode,
  ) -> Result<FetchOutcome, CcError> {
    if ctx.is_stale() {
      debug!("查找表已过期，取帧前重建");
      LutLoader.reload(ctx, store)?;
    }

    if self.state == AcquisitionState::Pending {
      warn!("上一次异步取帧尚未读出，其分段将被丢弃");
    }
    ctx.queue().flush();

    self
      .camera
      .set_mode(CameraMode::Segmentation)
      .map_err(|err| {
        warn!("{}", err);
        CcError::RemoteFailure(err.0)
      })?;

    let args = [output_addr, ctx.lut().addr()];
    match mode {
      CallMode::Sync => {
        self.state = AcquisitionState::Idle;
        let result = self.remote.call_sync(self.proc, &args)?;
        if result < 0 {
          warn!("像素核取帧失败，状态码: {}", result);
          return Err(CcError::RemoteFailure(result));
        }
        debug!("像素核取帧完成: {}", result);
        Ok(FetchOutcome::Completed(result))
      }
      CallMode::Async => {
        self.remote.call_async(self.proc, &args)?;
        self.state = AcquisitionState::Pending;
        debug!("异步取帧已发出");
        Ok(FetchOutcome::Pending)
      }
    }
  }
}
