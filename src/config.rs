// 该文件是 Shanan （山南西风） 项目的一部分。
// src/config.rs - 模块配置
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

use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::{
  CAM_RES2_HEIGHT, CAM_RES2_WIDTH, FromUrl, FromUrlWithScheme,
  queue::{DEFAULT_QUEUE_CAPACITY, QVAL_SIZE},
  serialize::{HEADER_SIZE, RLS_MEMORY_SIZE},
};

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("配置项 {0} 的值无效: {1}")]
  InvalidValue(String, String),
  #[error("未知配置项: {0}")]
  UnknownKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcConfig {
  pub frame_width: u16,
  pub frame_height: u16,
  /// 共享输出缓冲区字节数
  pub buffer_capacity: usize,
  /// 分段队列可容纳的分段数
  pub queue_capacity: usize,
  /// `cc_getRLSFrame` 默认渲染标志
  pub render_flags: u8,
}

impl Default for CcConfig {
  fn default() -> Self {
    Self {
      frame_width: CAM_RES2_WIDTH,
      frame_height: CAM_RES2_HEIGHT,
      buffer_capacity: RLS_MEMORY_SIZE,
      queue_capacity: DEFAULT_QUEUE_CAPACITY,
      render_flags: 0,
    }
  }
}

impl FromUrlWithScheme for CcConfig {
  const SCHEME: &'static str = "cc";
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
  value
    .parse()
    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))
}

impl FromUrl for CcConfig {
  type Error = ConfigError;

  /// `cc://?width=320&height=200&capacity=32768&queue=8192&flags=0`
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ConfigError::SchemeMismatch);
    }

    let mut config = CcConfig::default();
    for (k, v) in url.query_pairs() {
      match &*k {
        "width" => config.frame_width = parse(&k, &v)?,
        "height" => config.frame_height = parse(&k, &v)?,
        "capacity" => config.buffer_capacity = parse(&k, &v)?,
        "queue" => config.queue_capacity = parse(&k, &v)?,
        "flags" => config.render_flags = parse(&k, &v)?,
        other => return Err(ConfigError::UnknownKey(other.to_string())),
      }
    }
    config.check()?;
    Ok(config)
  }
}

impl CcConfig {
  /// 满队列必须能完整写入一帧 CCQ1
  pub fn check(&self) -> Result<(), ConfigError> {
    let needed = self
      .queue_capacity
      .checked_mul(QVAL_SIZE)
      .and_then(|n| n.checked_add(HEADER_SIZE));
    match needed {
      Some(needed) if needed <= self.buffer_capacity => Ok(()),
      _ => Err(ConfigError::InvalidValue(
        "queue".to_string(),
        format!(
          "{} 个分段放不进 {} 字节的输出缓冲区",
          self.queue_capacity, self.buffer_capacity
        ),
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_overrides_defaults() {
    let url = Url::parse("cc://?width=640&capacity=1024&queue=64").unwrap();
    let config = CcConfig::from_url(&url).unwrap();
    assert_eq!(config.frame_width, 640);
    assert_eq!(config.frame_height, CAM_RES2_HEIGHT);
    assert_eq!(config.buffer_capacity, 1024);
  }

  #[test]
  fn rejects_bad_values() {
    let url = Url::parse("cc://?flags=300").unwrap();
    assert!(matches!(
      CcConfig::from_url(&url),
      Err(ConfigError::InvalidValue(..))
    ));
    let url = Url::parse("cc://?colour=red").unwrap();
    assert!(matches!(
      CcConfig::from_url(&url),
      Err(ConfigError::UnknownKey(_))
    ));
  }

  #[test]
  fn default_queue_fits_default_buffer() {
    let config = CcConfig::default();
    assert!(config.check().is_ok());
    assert_eq!(
      config.queue_capacity * QVAL_SIZE + HEADER_SIZE,
      config.buffer_capacity
    );
  }

  #[test]
  fn rejects_queue_larger_than_buffer() {
    let url = Url::parse("cc://?capacity=1024&queue=253").unwrap();
    assert!(matches!(
      CcConfig::from_url(&url),
      Err(ConfigError::InvalidValue(ref key, _)) if key == "queue"
    ));
    let url = Url::parse("cc://?capacity=1024&queue=252").unwrap();
    assert_eq!(CcConfig::from_url(&url).unwrap().queue_capacity, 252);
  }
}
