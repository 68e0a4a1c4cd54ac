// 该文件是 Shanan （山南西风） 项目的一部分。
// src/sim.rs - 像素核、相机与色块引擎的模拟实现
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

//! 在没有双核硬件的主机上运行整条流水线：命令行工具和测试都用这些实现。

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
  acquire::{Camera, CameraError, CameraMode, GET_RLS_FRAME_PROC},
  calibrate::{BlobEngine, EngineError, Fit},
  frame::{Point16, RawFrame, RectA},
  lut::{ColorModel, Line},
  proc_table::ProcEntry,
  queue::{Qval, SegmentQueue},
  rpc::{CallMode, HostLink, ProcHandle, RemoteCore, RpcError},
};

const SIM_PROC_HANDLE: ProcHandle = ProcHandle(1);
const SYNTHETIC_BLOCK_W: u16 = 40;
const SYNTHETIC_BLOCK_H: u16 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCall {
  pub mode: CallMode,
  pub output_addr: usize,
  pub lut_addr: usize,
  /// 调用发生时队列里已有的分段数
  pub queued_before: usize,
}

/// 模拟像素核：按脚本或合成图案向共享队列写入分段
pub struct SimPixelCore {
  queue: SegmentQueue,
  script: VecDeque<Vec<Qval>>,
  synthetic: Option<(u16, u16)>,
  frame_index: u32,
  fail_status: Option<i32>,
  has_proc: bool,
  calls: Vec<SimCall>,
}

impl SimPixelCore {
  pub fn new(queue: SegmentQueue) -> Self {
    Self {
      queue,
      script: VecDeque::new(),
      synthetic: None,
      frame_index: 0,
      fail_status: None,
      has_proc: true,
      calls: Vec::new(),
    }
  }

  /// 追加一帧脚本分段，按调用顺序依次产出
  pub fn with_frame(mut self, segments: Vec<Qval>) -> Self {
    self.script.push_back(segments);
    self
  }

  /// 脚本用尽后产出一个水平移动的色块
  pub fn with_synthetic(mut self, width: u16, height: u16) -> Self {
    self.synthetic = Some((width, height));
    self
  }

  pub fn failing(mut self, status: i32) -> Self {
    self.fail_status = Some(status);
    self
  }

  pub fn without_proc(mut self) -> Self {
    self.has_proc = false;
    self
  }

  pub fn calls(&self) -> &[SimCall] {
    &self.calls
  }

  fn next_segments(&mut self) -> Vec<Qval> {
    if let Some(frame) = self.script.pop_front() {
      return frame;
    }
    let Some((width, height)) = self.synthetic else {
      return Vec::new();
    };

    let span = width.saturating_sub(SYNTHETIC_BLOCK_W).max(1) as u32;
    let left = ((self.frame_index * 4) % span) as u16;
    let top = height.saturating_sub(SYNTHETIC_BLOCK_H) / 2;
    let mut segments = Vec::with_capacity(2 * SYNTHETIC_BLOCK_H as usize);
    for row in top..top.saturating_add(SYNTHETIC_BLOCK_H).min(height) {
      segments.push(Qval::line(row));
      segments.push(Qval::segment(1, left, SYNTHETIC_BLOCK_W));
    }
    segments
  }

  fn produce(&mut self) -> usize {
    let segments = self.next_segments();
    self.frame_index = self.frame_index.wrapping_add(1);
    let pushed = segments.into_iter().filter(|q| self.queue.push(*q)).count();
    trace!("模拟像素核写入 {} 个分段", pushed);
    pushed
  }

  fn record(&mut self, mode: CallMode, args: &[usize]) -> Result<(), RpcError> {
    let [output_addr, lut_addr] = args else {
      return Err(RpcError::Link(format!("参数个数错误: {}", args.len())));
    };
    self.calls.push(SimCall {
      mode,
      output_addr: *output_addr,
      lut_addr: *lut_addr,
      queued_before: self.queue.len(),
    });
    Ok(())
  }
}

impl RemoteCore for SimPixelCore {
  fn get_proc(&mut self, name: &str) -> Result<ProcHandle, RpcError> {
    if self.has_proc && name == GET_RLS_FRAME_PROC {
      Ok(SIM_PROC_HANDLE)
    } else {
      Err(RpcError::ProcNotFound(name.to_string()))
    }
  }

  fn call_sync(&mut self, proc: ProcHandle, args: &[usize]) -> Result<i32, RpcError> {
    if proc != SIM_PROC_HANDLE {
      return Err(RpcError::ProcNotFound(format!("{:?}", proc)));
    }
    self.record(CallMode::Sync, args)?;
    if let Some(status) = self.fail_status {
      return Ok(status);
    }
    Ok(self.produce() as i32)
  }

  fn call_async(&mut self, proc: ProcHandle, args: &[usize]) -> Result<(), RpcError> {
    if proc != SIM_PROC_HANDLE {
      return Err(RpcError::ProcNotFound(format!("{:?}", proc)));
    }
    self.record(CallMode::Async, args)?;
    if self.fail_status.is_none() {
      self.produce();
    }
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct SimCamera {
  mode: Option<CameraMode>,
  switches: usize,
  fail_status: Option<i32>,
}

impl SimCamera {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing(status: i32) -> Self {
    Self {
      fail_status: Some(status),
      ..Self::default()
    }
  }

  pub fn mode(&self) -> Option<CameraMode> {
    self.mode
  }

  pub fn switches(&self) -> usize {
    self.switches
  }
}

impl Camera for SimCamera {
  fn set_mode(&mut self, mode: CameraMode) -> Result<(), CameraError> {
    if let Some(status) = self.fail_status {
      return Err(CameraError(status));
    }
    if self.mode != Some(mode) {
      debug!("相机切换到 {:?}", mode);
      self.switches += 1;
    }
    self.mode = Some(mode);
    Ok(())
  }
}

/// 返回固定模型与评分的色块引擎
#[derive(Debug, Clone)]
pub struct FixedEngine {
  model: ColorModel,
  score: u8,
  grow: u16,
  fits: usize,
  fail_status: Option<i32>,
}

impl Default for FixedEngine {
  fn default() -> Self {
    Self::new(Self::default_model(), 80)
  }
}

impl FixedEngine {
  /// 围绕 v = 0、u = v 的窄色带
  pub fn default_model() -> ColorModel {
    ColorModel::from_lines([
      Line::new(0.0, -8.0),
      Line::new(0.0, 8.0),
      Line::new(1.0, -6.0),
      Line::new(1.0, 6.0),
    ])
  }

  pub fn new(model: ColorModel, score: u8) -> Self {
    Self {
      model,
      score,
      grow: 16,
      fits: 0,
      fail_status: None,
    }
  }

  /// 每次拟合都返回给定的错误状态
  pub fn failing(mut self, status: i32) -> Self {
    self.fail_status = Some(status);
    self
  }

  /// 单点标定时生长出的正方形边长
  pub fn with_grow(mut self, grow: u16) -> Self {
    self.grow = grow.max(1);
    self
  }

  pub fn fits(&self) -> usize {
    self.fits
  }
}

impl BlobEngine for FixedEngine {
  fn fit_region(
    &mut self,
    _slot: u8,
    frame: &RawFrame,
    region: &RectA,
  ) -> Result<Fit, EngineError> {
    if let Some(status) = self.fail_status {
      return Err(EngineError(status));
    }
    if !frame.contains(region) {
      return Err(EngineError(-2));
    }
    self.fits += 1;
    Ok(Fit {
      model: self.model,
      score: self.score,
    })
  }

  fn fit_point(
    &mut self,
    _slot: u8,
    frame: &RawFrame,
    point: Point16,
  ) -> Result<(Fit, RectA), EngineError> {
    if let Some(status) = self.fail_status {
      return Err(EngineError(status));
    }
    if frame.pixel(point.x, point.y).is_none() {
      return Err(EngineError(-2));
    }
    let half = self.grow / 2;
    let x = point.x.saturating_sub(half);
    let y = point.y.saturating_sub(half);
    let region = RectA::new(
      x,
      y,
      self.grow.min(frame.width() - x),
      self.grow.min(frame.height() - y),
    );
    self.fits += 1;
    Ok((
      Fit {
        model: self.model,
        score: self.score,
      },
      region,
    ))
  }
}

/// 记录注册的过程与发送的每一帧
#[derive(Debug, Default)]
pub struct RecordingLink {
  pub registered: Vec<&'static str>,
  pub frames: Vec<Vec<u8>>,
}

impl RecordingLink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn last_frame(&self) -> Option<&[u8]> {
    self.frames.last().map(Vec::as_slice)
  }
}

impl HostLink for RecordingLink {
  fn register_module(&mut self, procedures: &'static [ProcEntry]) -> Result<(), RpcError> {
    self.registered.extend(procedures.iter().map(|p| p.name));
    Ok(())
  }

  fn use_buffer(&mut self, data: &[u8]) -> Result<(), RpcError> {
    self.frames.push(data.to_vec());
    Ok(())
  }
}
