// 该文件是 Shanan （山南西风） 项目的一部分。
// src/serialize.rs - CCQ1/CCB1 线缆帧序列化
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

//! 两种线缆帧共用 16 字节帧头（小端）：
//!
//! ```text
//! 0  tag[4]   "CCQ1" / "CCB1"
//! 4  flags u8
//! 5  pad   u8
//! 6  width u16
//! 8  height u16
//! 10 pad   u16
//! 12 count u32   CCQ1 为分段数，CCB1 为载荷中的 u16 字数（每个色块 5 个字）
//! 16 payload
//! ```

use tracing::debug;

use crate::{error::CcError, frame::BlobA, queue::SegmentQueue};

pub const CCQ1: [u8; 4] = *b"CCQ1";
pub const CCB1: [u8; 4] = *b"CCB1";

pub const HEADER_SIZE: usize = 16;
pub const RLS_MEMORY_SIZE: usize = 0x8000;

pub const RENDER_FLAG_FLUSH: u8 = 0x01;
pub const RENDER_FLAG_BLEND_BG: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
  pub tag: [u8; 4],
  pub render_flags: u8,
  pub width: u16,
  pub height: u16,
  pub count: u32,
}

impl FrameHeader {
  fn placeholder() -> Self {
    Self {
      tag: [0; 4],
      render_flags: 0,
      width: 0,
      height: 0,
      count: 0,
    }
  }

  fn encode(&self, dest: &mut [u8]) {
    dest[0..4].copy_from_slice(&self.tag);
    dest[4] = self.render_flags;
    dest[5] = 0;
    dest[6..8].copy_from_slice(&self.width.to_le_bytes());
    dest[8..10].copy_from_slice(&self.height.to_le_bytes());
    dest[10..12].fill(0);
    dest[12..16].copy_from_slice(&self.count.to_le_bytes());
  }

  pub fn decode(src: &[u8]) -> Option<Self> {
    if src.len() < HEADER_SIZE {
      return None;
    }
    Some(Self {
      tag: [src[0], src[1], src[2], src[3]],
      render_flags: src[4],
      width: u16::from_le_bytes([src[6], src[7]]),
      height: u16::from_le_bytes([src[8], src[9]]),
      count: u32::from_le_bytes([src[12], src[13], src[14], src[15]]),
    })
  }
}

/// 主机端解码 CCQ1 帧的分段字
pub fn decode_segments(frame: &[u8]) -> Option<Vec<u32>> {
  let header = FrameHeader::decode(frame)?;
  if header.tag != CCQ1 {
    return None;
  }
  let payload = frame.get(HEADER_SIZE..HEADER_SIZE + header.count as usize * 4)?;
  Some(
    payload
      .chunks_exact(4)
      .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect(),
  )
}

/// 主机端解码 CCB1 帧的色块列表
pub fn decode_blobs(frame: &[u8]) -> Option<Vec<BlobA>> {
  let header = FrameHeader::decode(frame)?;
  if header.tag != CCB1 {
    return None;
  }
  let words = header.count as usize;
  if words % BlobA::WIRE_WORDS != 0 {
    return None;
  }
  let payload = frame.get(HEADER_SIZE..HEADER_SIZE + words * 2)?;
  Some(
    payload
      .chunks_exact(BlobA::WIRE_SIZE)
      .map(|c| {
        let word = |i: usize| u16::from_le_bytes([c[2 * i], c[2 * i + 1]]);
        BlobA {
          model: word(0),
          left: word(1),
          right: word(2),
          top: word(3),
          bottom: word(4),
        }
      })
      .collect(),
  )
}

/// 定长的共享输出缓冲区，每次请求复用。
///
/// 所有写入都先检查容量，放不下时返回 `CapacityExceeded`，不会截断。
pub struct FrameBuffer {
  data: Box<[u8]>,
  len: usize,
  reserved: bool,
}

impl Default for FrameBuffer {
  fn default() -> Self {
    Self::with_capacity(RLS_MEMORY_SIZE)
  }
}

impl FrameBuffer {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      data: vec![0u8; capacity].into_boxed_slice(),
      len: 0,
      reserved: false,
    }
  }

  pub fn capacity(&self) -> usize {
    self.data.len()
  }

  /// 已写入的帧内容
  pub fn as_bytes(&self) -> &[u8] {
    &self.data[..self.len]
  }

  /// 缓冲区中 `offset` 处的地址，交给像素核写入
  pub fn addr_at(&self, offset: usize) -> usize {
    self.data.as_ptr() as usize + offset.min(self.data.len())
  }

  pub fn is_reserved(&self) -> bool {
    self.reserved
  }

  /// 放弃已预留的帧头，取帧失败时调用
  pub fn release(&mut self) {
    self.reserved = false;
    self.len = 0;
  }

  fn check_capacity(&self, needed: usize) -> Result<(), CcError> {
    if needed > self.capacity() {
      return Err(CcError::CapacityExceeded {
        needed,
        available: self.capacity(),
      });
    }
    Ok(())
  }

  /// 写入占位帧头，返回载荷偏移。必须先于像素核取帧调用。
  pub fn begin_segment_frame(&mut self) -> Result<usize, CcError> {
    self.check_capacity(HEADER_SIZE)?;
    FrameHeader::placeholder().encode(&mut self.data[..HEADER_SIZE]);
    self.len = HEADER_SIZE;
    self.reserved = true;
    Ok(HEADER_SIZE)
  }

  /// 将队列中的分段直接读入载荷区，再回填真实的分段数
  pub fn finish_segment_frame(
    &mut self,
    queue: &SegmentQueue,
    render_flags: u8,
    width: u16,
    height: u16,
  ) -> Result<u32, CcError> {
    if !self.reserved {
      return Err(CcError::InvalidArgument("未预留 CCQ1 帧头".to_string()));
    }
    self.reserved = false;

    let count = queue.read_into(&mut self.data[HEADER_SIZE..])?;
    let header = FrameHeader {
      tag: CCQ1,
      render_flags,
      width,
      height,
      count: count as u32,
    };
    header.encode(&mut self.data[..HEADER_SIZE]);
    self.len = HEADER_SIZE + count * 4;
    debug!("CCQ1 帧已序列化: {} 个分段, {} 字节", count, self.len);
    Ok(header.count)
  }

  pub fn write_blob_frame(
    &mut self,
    blobs: &[BlobA],
    render_flags: u8,
    width: u16,
    height: u16,
  ) -> Result<usize, CcError> {
    let needed = HEADER_SIZE + blobs.len() * BlobA::WIRE_SIZE;
    self.check_capacity(needed)?;
    self.reserved = false;

    let header = FrameHeader {
      tag: CCB1,
      render_flags,
      width,
      height,
      count: (blobs.len() * BlobA::WIRE_WORDS) as u32,
    };
    header.encode(&mut self.data[..HEADER_SIZE]);
    let payload = &mut self.data[HEADER_SIZE..needed];
    for (chunk, blob) in payload.chunks_exact_mut(BlobA::WIRE_SIZE).zip(blobs) {
      for (dst, word) in chunk.chunks_exact_mut(2).zip(blob.to_words()) {
        dst.copy_from_slice(&word.to_le_bytes());
      }
    }
    self.len = needed;
    debug!("CCB1 帧已序列化: {} 个色块", blobs.len());
    Ok(needed)
  }
}
