// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 取帧任务
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

use std::{sync::mpsc, thread, time::Duration};
use tracing::{info, warn};

use crate::{
  ConnComp,
  acquire::Camera,
  calibrate::BlobEngine,
  rpc::{CallMode, HostLink, RemoteCore},
  store::ParamStore,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
  pub frames: usize,
  pub segments: u64,
}

pub trait Task<S, E, R, C>: Sized {
  type Error;
  fn run_task(
    self,
    cc: &mut ConnComp<S, E, R, C>,
    link: &mut dyn HostLink,
  ) -> Result<TaskReport, Self::Error>;
}

#[derive(Debug, Default)]
pub struct OneShotTask {
  render_flags: u8,
}

impl OneShotTask {
  pub fn with_render_flags(mut self, render_flags: u8) -> Self {
    self.render_flags = render_flags;
    self
  }
}

impl<S, E, R, C> Task<S, E, R, C> for OneShotTask
where
  S: ParamStore,
  E: BlobEngine,
  R: RemoteCore,
  C: Camera,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    cc: &mut ConnComp<S, E, R, C>,
    link: &mut dyn HostLink,
  ) -> Result<TaskReport, Self::Error> {
    info!("开始取帧...");
    let now = std::time::Instant::now();
    let result = cc.get_rls_frame(link, self.render_flags)?;
    info!("取帧完成，像素核返回 {}，耗时: {:.2?}", result, now.elapsed());
    Ok(TaskReport {
      frames: 1,
      segments: result.max(0) as u64,
    })
  }
}

#[derive(Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
  mode: CallMode,
  render_flags: u8,
  handle_interrupt: bool,
}

impl Default for ContinuousTask {
  fn default() -> Self {
    Self {
      frame_number: None,
      mode: CallMode::Sync,
      render_flags: 0,
      handle_interrupt: false,
    }
  }
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_mode(mut self, mode: CallMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn with_render_flags(mut self, render_flags: u8) -> Self {
    self.render_flags = render_flags;
    self
  }

  /// 安装 Ctrl-C 处理器，每个进程只能安装一次
  pub fn with_interrupt(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<S, E, R, C> Task<S, E, R, C> for ContinuousTask
where
  S: ParamStore,
  E: BlobEngine,
  R: RemoteCore,
  C: Camera,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    cc: &mut ConnComp<S, E, R, C>,
    link: &mut dyn HostLink,
  ) -> Result<TaskReport, Self::Error> {
    info!("开始连续取帧 ({:?})...", self.mode);
    let (tx, rx) = mpsc::channel();

    if self.handle_interrupt {
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        let _ = tx.send(());
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(30));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      })?;
    } else {
      drop(tx);
    }

    let mut report = TaskReport::default();
    let mut now = std::time::Instant::now();
    loop {
      if self.frame_number.is_some_and(|n| report.frames >= n) {
        info!("达到指定帧数 {}, 退出任务循环", report.frames);
        break;
      }

      let segments = match self.mode {
        CallMode::Sync => cc.get_rls_frame(link, self.render_flags)?.max(0) as u64,
        CallMode::Async => {
          cc.request_rls_frame_async()?;
          cc.collect_rls_frame(link, self.render_flags)? as u64
        }
      };
      report.frames += 1;
      report.segments += segments;
      info!(
        "第 {} 帧: {} 个分段，耗时: {:.2?}",
        report.frames,
        segments,
        now.elapsed()
      );
      now = std::time::Instant::now();

      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("任务完成，共 {} 帧", report.frames);
    Ok(report)
  }
}
