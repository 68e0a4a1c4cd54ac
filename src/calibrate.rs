// 该文件是 Shanan （山南西风） 项目的一部分。
// src/calibrate.rs - 颜色签名标定
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
use tracing::{info, warn};

use crate::{
  context::CcContext,
  error::CcError,
  frame::{BlobA, Point16, RawFrame, RectA},
  lut::ColorModel,
  rpc::HostLink,
  serialize::{FrameBuffer, RENDER_FLAG_BLEND_BG, RENDER_FLAG_FLUSH},
  store::{CalibrationStore, ParamStore, validate_slot},
};

/// 拟合结果，`score` 为 0（差）到 100（好）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
  pub model: ColorModel,
  pub score: u8,
}

#[derive(Error, Debug)]
#[error("色块引擎错误，状态码: {0}")]
pub struct EngineError(pub i32);

/// 色块引擎：负责从区域或单点拟合颜色模型
pub trait BlobEngine {
  fn fit_region(
    &mut self,
    slot: u8,
    frame: &RawFrame,
    region: &RectA,
  ) -> Result<Fit, EngineError>;

  /// 从单个像素生长区域并拟合，同时返回生长出的包围盒
  fn fit_point(
    &mut self,
    slot: u8,
    frame: &RawFrame,
    point: Point16,
  ) -> Result<(Fit, RectA), EngineError>;
}

/// 单点标定后回报色块所用的通道
pub struct PointReport<'a> {
  pub buffer: &'a mut FrameBuffer,
  pub link: &'a mut dyn HostLink,
  pub width: u16,
  pub height: u16,
}

pub struct SignatureCalibrator<E> {
  engine: E,
}

impl<E: BlobEngine> SignatureCalibrator<E> {
  pub fn new(engine: E) -> Self {
    Self { engine }
  }

  pub fn engine(&self) -> &E {
    &self.engine
  }

  pub fn engine_mut(&mut self) -> &mut E {
    &mut self.engine
  }

  pub fn calibrate_region<S: ParamStore>(
    &mut self,
    ctx: &mut CcContext,
    store: &mut CalibrationStore<S>,
    slot: u8,
    region: RectA,
  ) -> Result<u8, CcError> {
    validate_slot(slot)?;
    let frame = ctx.raw_frame().ok_or(CcError::NoInput)?;

    let fit = self
      .engine
      .fit_region(slot, frame, &region)
      .map_err(|err| CcError::Engine(err.0))?;

    store.write(slot, &fit.model)?;
    // 查找表在下一次取帧时才重建
    ctx.mark_stale();
    info!("签名 {} 区域标定完成，评分 {}", slot, fit.score);
    Ok(fit.score)
  }

  pub fn calibrate_point<S: ParamStore>(
    &mut self,
    ctx: &mut CcContext,
    store: &mut CalibrationStore<S>,
    slot: u8,
    point: Point16,
    report: Option<PointReport<'_>>,
  ) -> Result<u8, CcError> {
    validate_slot(slot)?;
    let frame = ctx.raw_frame().ok_or(CcError::NoInput)?;

    let (fit, region) = self
      .engine
      .fit_point(slot, frame, point)
      .map_err(|err| CcError::Engine(err.0))?;

    store.write(slot, &fit.model)?;
    ctx.mark_stale();
    info!(
      "签名 {} 单点标定完成，评分 {}，区域 {:?}",
      slot, fit.score, region
    );

    if let Some(report) = report {
      let blob = BlobA::from_region(slot, &region);
      let sent = report
        .buffer
        .write_blob_frame(
          &[blob],
          RENDER_FLAG_FLUSH | RENDER_FLAG_BLEND_BG,
          report.width,
          report.height,
        )
        .and_then(|_| {
          report
            .link
            .use_buffer(report.buffer.as_bytes())
            .map_err(CcError::from)
        });
      if let Err(err) = sent {
        warn!("标定结果已保存，但色块回报失败: {}", err);
      }
    }

    Ok(fit.score)
  }
}
