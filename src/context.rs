// 该文件是 Shanan （山南西风） 项目的一部分。
// src/context.rs - 连通域模块共享状态
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

use crate::{frame::RawFrame, lut::ColorLut, queue::SegmentQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutState {
  /// 与持久化签名一致
  Loaded,
  /// 等待重建
  Stale,
}

/// 查找表、分段队列与原始帧引用的唯一持有者。
pub struct CcContext {
  lut: ColorLut,
  lut_state: LutState,
  queue: SegmentQueue,
  raw_frame: Option<RawFrame>,
}

impl CcContext {
  pub fn new(queue: SegmentQueue) -> Self {
    Self {
      lut: ColorLut::new(),
      lut_state: LutState::Stale,
      queue,
      raw_frame: None,
    }
  }

  pub fn lut(&self) -> &ColorLut {
    &self.lut
  }

  pub(crate) fn lut_mut(&mut self) -> &mut ColorLut {
    &mut self.lut
  }

  /// 仅在查找表与持久化签名一致时返回
  pub fn loaded_lut(&self) -> Option<&ColorLut> {
    match self.lut_state {
      LutState::Loaded => Some(&self.lut),
      LutState::Stale => None,
    }
  }

  pub fn lut_state(&self) -> LutState {
    self.lut_state
  }

  /// 原始帧占用了查找表所在内存，持有原始帧同样视为过期
  pub fn is_stale(&self) -> bool {
    self.lut_state == LutState::Stale || self.raw_frame.is_some()
  }

  pub(crate) fn mark_stale(&mut self) {
    self.lut_state = LutState::Stale;
  }

  pub(crate) fn mark_loaded(&mut self) {
    self.lut_state = LutState::Loaded;
  }

  pub fn queue(&self) -> &SegmentQueue {
    &self.queue
  }

  pub fn raw_frame(&self) -> Option<&RawFrame> {
    self.raw_frame.as_ref()
  }

  pub fn set_raw_frame(&mut self, frame: RawFrame) {
    self.raw_frame = Some(frame);
    self.lut_state = LutState::Stale;
  }

  pub fn clear_raw_frame(&mut self) -> Option<RawFrame> {
    self.raw_frame.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_frame_marks_stale() {
    let mut ctx = CcContext::new(SegmentQueue::with_capacity(4));
    ctx.mark_loaded();
    assert!(!ctx.is_stale());
    ctx.set_raw_frame(RawFrame::zeroed(4, 4));
    assert!(ctx.is_stale());
    assert!(ctx.loaded_lut().is_none());
    assert!(ctx.clear_raw_frame().is_some());
    assert!(ctx.raw_frame().is_none());
  }
}
