// 该文件是 Shanan （山南西风） 项目的一部分。
// src/queue.rs - 游程分段队列
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

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::trace;

use crate::{
  error::CcError,
  serialize::{HEADER_SIZE, RLS_MEMORY_SIZE},
};

pub const QVAL_SIZE: usize = 4;
/// 满队列恰好放进默认输出缓冲区的载荷区
pub const DEFAULT_QUEUE_CAPACITY: usize = (RLS_MEMORY_SIZE - HEADER_SIZE) / QVAL_SIZE;

const MODEL_BITS: u32 = 3;
const COLUMN_SHIFT: u32 = 3;
const COLUMN_MASK: u32 = 0x1ff;
const LENGTH_SHIFT: u32 = 12;
const LENGTH_MASK: u32 = 0x1ff;

/// 单个游程分段，一个 32 位机器字。
///
/// 位 0..3 为签名编号，位 3..12 为起始列，位 12..21 为游程长度；
/// 签名编号为 0 时表示行标记，位 3..12 存放行号。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qval(pub u32);

impl Qval {
  pub fn segment(model: u8, column: u16, length: u16) -> Self {
    let model = model as u32 & ((1 << MODEL_BITS) - 1);
    let column = (column as u32 & COLUMN_MASK) << COLUMN_SHIFT;
    let length = (length as u32 & LENGTH_MASK) << LENGTH_SHIFT;
    Qval(model | column | length)
  }

  pub fn line(row: u16) -> Self {
    Qval((row as u32 & COLUMN_MASK) << COLUMN_SHIFT)
  }

  pub fn model(&self) -> u8 {
    (self.0 & ((1 << MODEL_BITS) - 1)) as u8
  }

  pub fn is_line(&self) -> bool {
    self.model() == 0
  }

  pub fn column(&self) -> u16 {
    ((self.0 >> COLUMN_SHIFT) & COLUMN_MASK) as u16
  }

  pub fn row(&self) -> u16 {
    self.column()
  }

  pub fn length(&self) -> u16 {
    ((self.0 >> LENGTH_SHIFT) & LENGTH_MASK) as u16
  }
}

struct QueueInner {
  values: VecDeque<Qval>,
  capacity: usize,
  dropped: u64,
}

/// 像素核写入、本核读出的有界分段队列
#[derive(Clone)]
pub struct SegmentQueue {
  inner: Arc<Mutex<QueueInner>>,
}

impl Default for SegmentQueue {
  fn default() -> Self {
    Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
  }
}

impl SegmentQueue {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      inner: Arc::new(Mutex::new(QueueInner {
        values: VecDeque::with_capacity(capacity),
        capacity,
        dropped: 0,
      })),
    }
  }

  fn lock(&self) -> MutexGuard<'_, QueueInner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// 生产者写入；队列已满时丢弃并返回 `false`
  pub fn push(&self, value: Qval) -> bool {
    let mut inner = self.lock();
    if inner.values.len() >= inner.capacity {
      inner.dropped += 1;
      return false;
    }
    inner.values.push_back(value);
    true
  }

  /// 清空队列，返回丢弃的分段数
  pub fn flush(&self) -> usize {
    let mut inner = self.lock();
    let flushed = inner.values.len();
    inner.values.clear();
    flushed
  }

  pub fn len(&self) -> usize {
    self.lock().values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().values.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.lock().capacity
  }

  pub fn dropped(&self) -> u64 {
    self.lock().dropped
  }

  /// 将全部分段以小端字直接写入 `dest`，返回分段数。
  ///
  /// 目标空间放不下全部分段时不取出任何分段，返回 `CapacityExceeded`。
  pub fn read_into(&self, dest: &mut [u8]) -> Result<usize, CcError> {
    let mut inner = self.lock();
    let count = inner.values.len();
    let needed = count * QVAL_SIZE;
    if needed > dest.len() {
      return Err(CcError::CapacityExceeded {
        needed,
        available: dest.len(),
      });
    }
    for (chunk, value) in dest.chunks_exact_mut(QVAL_SIZE).zip(inner.values.drain(..)) {
      chunk.copy_from_slice(&value.0.to_le_bytes());
    }
    trace!("读出 {} 个分段", count);
    Ok(count)
  }
}
