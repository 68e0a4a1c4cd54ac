// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - 原始帧与几何类型定义
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

use std::sync::Arc;

/// 相机采集的原始 Bayer 帧。
///
/// 像素数据以引用计数共享，上下文只持有一个非独占的引用，
/// 清除引用不会影响相机子系统里的缓冲区。
#[derive(Debug, Clone)]
pub struct RawFrame {
  width: u16,
  height: u16,
  pixels: Arc<[u8]>,
}

impl RawFrame {
  pub fn new(width: u16, height: u16, pixels: Arc<[u8]>) -> Option<Self> {
    if pixels.len() != width as usize * height as usize {
      return None;
    }
    Some(Self {
      width,
      height,
      pixels,
    })
  }

  pub fn zeroed(width: u16, height: u16) -> Self {
    let pixels: Arc<[u8]> = vec![0u8; width as usize * height as usize].into();
    Self {
      width,
      height,
      pixels,
    }
  }

  pub fn width(&self) -> u16 {
    self.width
  }

  pub fn height(&self) -> u16 {
    self.height
  }

  pub fn pixels(&self) -> &Arc<[u8]> {
    &self.pixels
  }

  pub fn pixel(&self, x: u16, y: u16) -> Option<u8> {
    if x >= self.width || y >= self.height {
      return None;
    }
    self
      .pixels
      .get(y as usize * self.width as usize + x as usize)
      .copied()
  }

  pub fn contains(&self, rect: &RectA) -> bool {
    rect.width > 0
      && rect.height > 0
      && rect.x_offset as u32 + rect.width as u32 <= self.width as u32
      && rect.y_offset as u32 + rect.height as u32 <= self.height as u32
  }
}

/// 轴对齐矩形区域（帧像素坐标）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RectA {
  pub x_offset: u16,
  pub y_offset: u16,
  pub width: u16,
  pub height: u16,
}

impl RectA {
  pub fn new(x_offset: u16, y_offset: u16, width: u16, height: u16) -> Self {
    Self {
      x_offset,
      y_offset,
      width,
      height,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point16 {
  pub x: u16,
  pub y: u16,
}

impl Point16 {
  pub fn new(x: u16, y: u16) -> Self {
    Self { x, y }
  }
}

/// 色块描述：所属签名编号与包围盒
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobA {
  pub model: u16,
  pub left: u16,
  pub right: u16,
  pub top: u16,
  pub bottom: u16,
}

impl BlobA {
  /// 线缆格式中单个色块描述的字节数
  pub const WIRE_SIZE: usize = 10;
  /// 线缆格式中单个色块描述的 u16 字数
  pub const WIRE_WORDS: usize = 5;

  pub fn from_region(model: u8, region: &RectA) -> Self {
    Self {
      model: model as u16,
      left: region.x_offset,
      right: region.x_offset.saturating_add(region.width),
      top: region.y_offset,
      bottom: region.y_offset.saturating_add(region.height),
    }
  }

  pub fn to_words(&self) -> [u16; 5] {
    [self.model, self.left, self.right, self.top, self.bottom]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_frame_rejects_wrong_length() {
    let pixels: Arc<[u8]> = vec![0u8; 10].into();
    assert!(RawFrame::new(4, 4, pixels).is_none());
  }

  #[test]
  fn contains_checks_bounds() {
    let frame = RawFrame::zeroed(320, 200);
    assert!(frame.contains(&RectA::new(10, 10, 20, 20)));
    assert!(frame.contains(&RectA::new(300, 180, 20, 20)));
    assert!(!frame.contains(&RectA::new(301, 180, 20, 20)));
    assert!(!frame.contains(&RectA::new(0, 0, 0, 5)));
  }

  #[test]
  fn blob_from_region_spans_box() {
    let blob = BlobA::from_region(3, &RectA::new(5, 6, 10, 12));
    assert_eq!(blob.to_words(), [3, 5, 15, 6, 18]);
  }
}
