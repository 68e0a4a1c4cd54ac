// 该文件是 Shanan （山南西风） 项目的一部分。
// src/proc_table.rs - 对主机开放的过程表
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

use crate::{
  error::CcError,
  frame::{Point16, RectA},
};

pub const REGION_FOURCC: [u8; 4] = *b"REG1";
pub const POINT_FOURCC: [u8; 4] = *b"PNT1";

/// 过程参数类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
  U8,
  U16,
  U32,
  /// 用户框选区域，线缆类型 `REG1`
  Region,
  /// 用户点选坐标，线缆类型 `PNT1`
  Point,
  Bytes,
}

impl ArgType {
  pub fn fourcc(&self) -> Option<[u8; 4]> {
    match self {
      ArgType::Region => Some(REGION_FOURCC),
      ArgType::Point => Some(POINT_FOURCC),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
  U8(u8),
  U16(u16),
  U32(u32),
  Region(RectA),
  Point(Point16),
  Bytes(Vec<u8>),
}

impl ArgValue {
  pub fn arg_type(&self) -> ArgType {
    match self {
      ArgValue::U8(_) => ArgType::U8,
      ArgValue::U16(_) => ArgType::U16,
      ArgValue::U32(_) => ArgType::U32,
      ArgValue::Region(_) => ArgType::Region,
      ArgValue::Point(_) => ArgType::Point,
      ArgValue::Bytes(_) => ArgType::Bytes,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
  GetRlsFrame,
  SetSigRegion,
  SetSigPoint,
  SetMemory,
}

#[derive(Debug)]
pub struct ProcEntry {
  pub name: &'static str,
  pub procedure: Procedure,
  pub args: &'static [ArgType],
  pub doc: &'static str,
}

impl ProcEntry {
  pub fn check_args(&self, args: &[ArgValue]) -> Result<(), CcError> {
    let matches = args.len() == self.args.len()
      && args
        .iter()
        .zip(self.args)
        .all(|(value, ty)| value.arg_type() == *ty);
    if !matches {
      let found: Vec<ArgType> = args.iter().map(ArgValue::arg_type).collect();
      return Err(CcError::InvalidArgument(format!(
        "{} 参数签名不匹配: 期望 {:?}，实际 {:?}",
        self.name, self.args, found
      )));
    }
    Ok(())
  }
}

pub static CC_PROCEDURES: &[ProcEntry] = &[
  ProcEntry {
    name: "cc_getRLSFrame",
    procedure: Procedure::GetRlsFrame,
    args: &[],
    doc: "Get a frame of color run-length segments (RLS)\n\
          @r 0 if success, negative if error\n\
          @r CCQ1 formated data, including 8-palette",
  },
  ProcEntry {
    name: "cc_setSigRegion",
    procedure: Procedure::SetSigRegion,
    args: &[ArgType::U8, ArgType::Region],
    doc: "Set model by selecting region in image\n\
          @p model numerical index of model, can be 1-7\n\
          @p region user-selected region\n\
          @r 0 to 100 if success where 100=good, 0=poor, negative if error",
  },
  ProcEntry {
    name: "cc_setSigPoint",
    procedure: Procedure::SetSigPoint,
    args: &[ArgType::U8, ArgType::Point],
    doc: "Set model by selecting point in image\n\
          @p model numerical index of model, can be 1-7\n\
          @p point user-selected point\n\
          @r 0 to 100 if success where 100=good, 0=poor, negative if error",
  },
  ProcEntry {
    name: "cc_setMemory",
    procedure: Procedure::SetMemory,
    args: &[ArgType::U32, ArgType::Bytes],
    doc: "Write bytes verbatim to an absolute address (debug hook)\n\
          @p location destination address\n\
          @p data bytes to write\n\
          @r number of bytes written",
  },
];

pub fn lookup(name: &str) -> Option<&'static ProcEntry> {
  CC_PROCEDURES.iter().find(|entry| entry.name == name)
}

/// 将 `data` 原样写入绝对地址 `location`，返回写入字节数。
///
/// 这是调试用的后门，不做任何边界检查。
///
/// # Safety
///
/// 调用方必须保证 `location..location + data.len()` 在本核地址空间内可写，
/// 且写入期间没有其他引用访问这段内存。
pub unsafe fn set_memory(location: usize, data: &[u8]) -> i32 {
  let dest = location as *mut u8;
  // SAFETY: 目标地址的有效性由调用方保证，源与目标可能重叠，因此使用 copy
  unsafe {
    std::ptr::copy(data.as_ptr(), dest, data.len());
  }
  data.len() as i32
}
