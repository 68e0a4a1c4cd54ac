// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/cc_console.rs - 连通域模块命令行控制台
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

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use url::Url;

use shanan_cc::{
  ConnComp, FromUrl,
  config::CcConfig,
  conncomp::ConnCompParts,
  frame::{Point16, RectA},
  input::InputWrapper,
  link::LinkWrapper,
  queue::SegmentQueue,
  rpc::{CallMode, HostLink},
  sim::{FixedEngine, SimCamera, SimPixelCore},
  store::ParamStoreWrapper,
  task::{ContinuousTask, OneShotTask, Task},
};

/// 颜色连通域控制台：在模拟像素核上标定签名并获取 CCQ1 帧
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 参数存储（memory:// 或 flash:///path/params.json）
  #[arg(long, value_name = "STORE", default_value = "memory://")]
  pub store: Url,
  /// 模块配置（cc://?width=320&height=200&capacity=32768）
  #[arg(long, value_name = "CONFIG", default_value = "cc://")]
  pub config: Url,
  /// 主机链路（null:// 或 folder:///path）
  #[arg(long, value_name = "OUTPUT", default_value = "null://")]
  pub output: Url,
  /// 原始帧来源（synthetic:// 或 image:///path.png）
  #[arg(long, value_name = "SOURCE", default_value = "synthetic://")]
  pub input: Url,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 获取一帧
  Frame,
  /// 连续获取帧
  Stream {
    /// 最大帧数，不指定时直到 Ctrl-C
    #[arg(long)]
    frames: Option<usize>,
    /// 使用异步取帧
    #[arg(long = "async")]
    use_async: bool,
  },
  /// 框选区域标定签名
  CalibrateRegion {
    #[arg(long)]
    slot: u8,
    #[arg(long)]
    x: u16,
    #[arg(long)]
    y: u16,
    #[arg(long)]
    width: u16,
    #[arg(long)]
    height: u16,
  },
  /// 点选坐标标定签名
  CalibratePoint {
    #[arg(long)]
    slot: u8,
    #[arg(long)]
    x: u16,
    #[arg(long)]
    y: u16,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("参数存储: {}", args.store);
  info!("模块配置: {}", args.config);
  info!("主机链路: {}", args.output);
  info!("原始帧来源: {}", args.input);

  let config = CcConfig::from_url(&args.config)?;
  let store = ParamStoreWrapper::from_url(&args.store)?;
  let mut link = LinkWrapper::from_url(&args.output)?;
  let input = InputWrapper::from_url(&args.input)?;

  let queue = SegmentQueue::with_capacity(config.queue_capacity);
  let remote = SimPixelCore::new(queue.clone()).with_synthetic(config.frame_width, config.frame_height);
  let parts = ConnCompParts {
    store,
    engine: FixedEngine::default(),
    remote,
    camera: SimCamera::new(),
    queue,
  };
  let mut cc = ConnComp::init(config, parts, &mut link)?;

  match args.command {
    Command::Frame => {
      let report = OneShotTask::default().run_task(&mut cc, &mut link)?;
      info!("分段数: {}", report.segments);
    }
    Command::Stream { frames, use_async } => {
      let mode = if use_async { CallMode::Async } else { CallMode::Sync };
      let report = ContinuousTask::default()
        .with_frame_number(frames)
        .with_mode(mode)
        .with_interrupt(true)
        .run_task(&mut cc, &mut link)?;
      info!("总帧数: {}，总分段数: {}", report.frames, report.segments);
    }
    Command::CalibrateRegion {
      slot,
      x,
      y,
      width,
      height,
    } => {
      cc.capture_raw_frame(input.raw_frame());
      let score = cc.set_sig_region(slot, RectA::new(x, y, width, height))?;
      info!("签名 {} 标定评分: {}", slot, score);
    }
    Command::CalibratePoint { slot, x, y } => {
      cc.capture_raw_frame(input.raw_frame());
      let score = cc.set_sig_point(slot, Point16::new(x, y), Some(&mut link as &mut dyn HostLink))?;
      info!("签名 {} 标定评分: {}", slot, score);
    }
  }

  Ok(())
}
