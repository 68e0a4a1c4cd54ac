// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::RawFrame};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("Image too large: {0}x{1}")]
  TooLarge(u32, u32),
}

/// 读取 RGB 图像并按 BGGR 排列重采样成原始 Bayer 帧
pub struct ImageFileInput {
  frame: RawFrame,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let image = ImageReader::open(url.path())?.decode()?.to_rgb8();
    let frame = mosaic(&image)?;
    Ok(ImageFileInput { frame })
  }
}

impl ImageFileInput {
  pub fn raw_frame(&self) -> RawFrame {
    self.frame.clone()
  }
}

fn mosaic(image: &RgbImage) -> Result<RawFrame, ImageFileInputError> {
  let (width, height) = image.dimensions();
  let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
    return Err(ImageFileInputError::TooLarge(width, height));
  };

  let mut pixels = Vec::with_capacity(width as usize * height as usize);
  for y in 0..height {
    for x in 0..width {
      let pixel = image.get_pixel(x, y);
      let channel = match (y % 2, x % 2) {
        (0, 0) => 2, // B
        (1, 1) => 0, // R
        _ => 1,      // G
      };
      pixels.push(pixel[channel]);
    }
  }
  RawFrame::new(w, h, pixels.into()).ok_or(ImageFileInputError::TooLarge(width, height))
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn mosaic_picks_bggr_channels() {
    let image = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
    let frame = mosaic(&image).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(30));
    assert_eq!(frame.pixel(1, 0), Some(20));
    assert_eq!(frame.pixel(0, 1), Some(20));
    assert_eq!(frame.pixel(1, 1), Some(10));
  }
}
