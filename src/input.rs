// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - 原始帧来源
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
use url::Url;

use crate::{CAM_RES2_HEIGHT, CAM_RES2_WIDTH, FromUrl, FromUrlWithScheme, frame::RawFrame};

#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "read_image_file")]
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("Invalid query value: {0}")]
  InvalidQuery(String),
  #[error("URI scheme mismatch")]
  SchemeMismatch,
}

/// 合成的渐变 Bayer 帧
pub struct SyntheticInput {
  width: u16,
  height: u16,
}

impl FromUrlWithScheme for SyntheticInput {
  const SCHEME: &'static str = "synthetic";
}

impl FromUrl for SyntheticInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch);
    }
    let mut input = SyntheticInput {
      width: CAM_RES2_WIDTH,
      height: CAM_RES2_HEIGHT,
    };
    for (k, v) in url.query_pairs() {
      let value = || v.parse::<u16>().map_err(|_| InputError::InvalidQuery(v.to_string()));
      match &*k {
        "width" => input.width = value()?,
        "height" => input.height = value()?,
        _ => {}
      }
    }
    Ok(input)
  }
}

impl SyntheticInput {
  pub fn raw_frame(&self) -> RawFrame {
    let (w, h) = (self.width as usize, self.height as usize);
    let mut pixels = Vec::with_capacity(w * h);
    for y in 0..h {
      for x in 0..w {
        pixels.push(((x * 255 / w.max(1)) ^ (y * 255 / h.max(1))) as u8);
      }
    }
    RawFrame::new(self.width, self.height, pixels.into()).unwrap_or_else(|| {
      RawFrame::zeroed(self.width, self.height)
    })
  }
}

pub enum InputWrapper {
  Synthetic(SyntheticInput),
  #[cfg(feature = "read_image_file")]
  ReadImageFile(ImageFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() == SyntheticInput::SCHEME {
      return Ok(InputWrapper::Synthetic(SyntheticInput::from_url(url)?));
    }
    #[cfg(feature = "read_image_file")]
    {
      if url.scheme() == ImageFileInput::SCHEME {
        let input = ImageFileInput::from_url(url)?;
        return Ok(InputWrapper::ReadImageFile(input));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl InputWrapper {
  pub fn raw_frame(&self) -> RawFrame {
    match self {
      InputWrapper::Synthetic(input) => input.raw_frame(),
      #[cfg(feature = "read_image_file")]
      InputWrapper::ReadImageFile(input) => input.raw_frame(),
    }
  }
}
