// 该文件是 Shanan （山南西风） 项目的一部分。
// src/lut.rs - 颜色模型与颜色查找表
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

use tracing::{debug, info, warn};

use crate::{
  NUM_MODELS,
  context::CcContext,
  error::CcError,
  store::{CalibrationStore, ParamStore},
};

/// 单个颜色模型记录的字节数
pub const COLOR_MODEL_SIZE: usize = 32;

// 色度量化：u、v 各 6 位有符号
const LUT_CHROMA_BITS: u32 = 6;
const LUT_CHROMA_MIN: i8 = -(1 << (LUT_CHROMA_BITS - 1));
const LUT_CHROMA_MAX: i8 = (1 << (LUT_CHROMA_BITS - 1)) - 1;
pub const LUT_SIZE: usize = 1 << (2 * LUT_CHROMA_BITS);

/// 色度平面上的直线 `v = slope * u + intercept`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line {
  pub slope: f32,
  pub intercept: f32,
}

impl Line {
  pub fn new(slope: f32, intercept: f32) -> Self {
    Self { slope, intercept }
  }

  fn eval(&self, u: f32) -> f32 {
    self.slope * u + self.intercept
  }
}

/// 颜色签名：定长的不透明二进制记录。
///
/// 记录内容是四条小端 `f32` 直线（两条色相边界、两条饱和度边界），
/// 只有折叠进查找表时才会解释这些字节。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ColorModel([u8; COLOR_MODEL_SIZE]);

impl ColorModel {
  pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
    let bytes: [u8; COLOR_MODEL_SIZE] = bytes.try_into().ok()?;
    Some(Self(bytes))
  }

  pub fn from_lines(lines: [Line; 4]) -> Self {
    let mut bytes = [0u8; COLOR_MODEL_SIZE];
    for (chunk, line) in bytes.chunks_exact_mut(8).zip(lines.iter()) {
      chunk[..4].copy_from_slice(&line.slope.to_le_bytes());
      chunk[4..].copy_from_slice(&line.intercept.to_le_bytes());
    }
    Self(bytes)
  }

  pub fn lines(&self) -> [Line; 4] {
    let mut lines = [Line::default(); 4];
    for (line, chunk) in lines.iter_mut().zip(self.0.chunks_exact(8)) {
      let slope = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
      let intercept = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
      *line = Line::new(slope, intercept);
    }
    lines
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  pub fn is_zero(&self) -> bool {
    self.0.iter().all(|b| *b == 0)
  }

  /// 色度点 `(u, v)` 是否落在色相带与饱和度带的交集内
  pub fn matches(&self, u: i8, v: i8) -> bool {
    if self.is_zero() {
      return false;
    }
    let [hue_a, hue_b, sat_a, sat_b] = self.lines();
    between(&hue_a, &hue_b, u, v) && between(&sat_a, &sat_b, u, v)
  }
}

fn between(a: &Line, b: &Line, u: i8, v: i8) -> bool {
  let (lo, hi) = {
    let ya = a.eval(u as f32);
    let yb = b.eval(u as f32);
    if ya <= yb { (ya, yb) } else { (yb, ya) }
  };
  let v = v as f32;
  v >= lo && v <= hi
}

/// 颜色查找表：色度值到签名编号的映射（0 表示不匹配）。
pub struct ColorLut {
  table: Box<[u8]>,
  models: [Option<ColorModel>; NUM_MODELS as usize],
}

impl Default for ColorLut {
  fn default() -> Self {
    Self {
      table: vec![0u8; LUT_SIZE].into_boxed_slice(),
      models: [None; NUM_MODELS as usize],
    }
  }
}

impl ColorLut {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn clear(&mut self) {
    self.table.fill(0);
    self.models = [None; NUM_MODELS as usize];
  }

  fn index(u: i8, v: i8) -> usize {
    let u = u.clamp(LUT_CHROMA_MIN, LUT_CHROMA_MAX);
    let v = v.clamp(LUT_CHROMA_MIN, LUT_CHROMA_MAX);
    let u = (u as i16 - LUT_CHROMA_MIN as i16) as usize;
    let v = (v as i16 - LUT_CHROMA_MIN as i16) as usize;
    (u << LUT_CHROMA_BITS) | v
  }

  /// 将签名折叠进查找表，返回新占用的表项数。
  ///
  /// 已被低编号签名占用的表项不会被覆盖。
  pub fn add(&mut self, model: &ColorModel, slot: u8) -> usize {
    if slot == 0 || slot > NUM_MODELS {
      warn!("忽略超出范围的签名编号 {}", slot);
      return 0;
    }
    self.models[slot as usize - 1] = Some(*model);

    let mut claimed = 0;
    for u in LUT_CHROMA_MIN..=LUT_CHROMA_MAX {
      for v in LUT_CHROMA_MIN..=LUT_CHROMA_MAX {
        let entry = &mut self.table[Self::index(u, v)];
        if *entry == 0 && model.matches(u, v) {
          *entry = slot;
          claimed += 1;
        }
      }
    }
    claimed
  }

  pub fn classify(&self, u: i8, v: i8) -> u8 {
    self.table[Self::index(u, v)]
  }

  pub fn model(&self, slot: u8) -> Option<&ColorModel> {
    if slot == 0 || slot > NUM_MODELS {
      return None;
    }
    self.models[slot as usize - 1].as_ref()
  }

  pub fn loaded_models(&self) -> usize {
    self.models.iter().filter(|m| m.is_some()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.table.iter().all(|e| *e == 0)
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.table
  }

  /// 查找表在本核地址空间中的地址，交给像素核读取
  pub fn addr(&self) -> usize {
    self.table.as_ptr() as usize
  }
}

/// 查找表加载器：从持久化的签名整体重建查找表。
#[derive(Debug, Default, Clone, Copy)]
pub struct LutLoader;

impl LutLoader {
  pub fn reload<S: ParamStore>(
    &self,
    ctx: &mut CcContext,
    store: &CalibrationStore<S>,
  ) -> Result<(), CcError> {
    // 原始帧与查找表共用内存，必须先于读取签名丢弃
    if ctx.clear_raw_frame().is_some() {
      debug!("已清除原始帧引用");
    }
    ctx.mark_stale();
    ctx.lut_mut().clear();

    let lut = ctx.lut_mut();
    let folded = store.read_all(|slot, model| {
      let claimed = lut.add(&model, slot);
      debug!("签名 {} 折叠完成，占用 {} 个表项", slot, claimed);
    });

    if let Err(err) = folded {
      warn!("查找表重建失败: {}", err);
      ctx.lut_mut().clear();
      return Err(err);
    }

    let flushed = ctx.queue().flush();
    ctx.mark_loaded();
    info!("查找表已重建，丢弃 {} 个过期分段", flushed);
    Ok(())
  }
}
