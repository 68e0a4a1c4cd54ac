// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/task_tests.rs - 取帧任务
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

mod common;

use common::Harness;
use shanan_cc::{
  rpc::CallMode,
  serialize::{FrameHeader, RENDER_FLAG_FLUSH},
  task::{ContinuousTask, OneShotTask, Task, TaskReport},
};

#[test]
fn test_one_shot_task() {
  let (mut cc, mut link, _) = Harness::new()
    .remote(|remote| remote.with_synthetic(320, 200))
    .init();

  let report = OneShotTask::default()
    .with_render_flags(RENDER_FLAG_FLUSH)
    .run_task(&mut cc, &mut link)
    .unwrap();
  assert_eq!(
    report,
    TaskReport {
      frames: 1,
      segments: 60
    }
  );
  let header = FrameHeader::decode(link.last_frame().unwrap()).unwrap();
  assert_eq!(header.render_flags, RENDER_FLAG_FLUSH);
}

#[test]
fn test_continuous_task_stops_at_frame_number() {
  let (mut cc, mut link, _) = Harness::new()
    .remote(|remote| remote.with_synthetic(320, 200))
    .init();

  let report = ContinuousTask::default()
    .with_frame_number(Some(3))
    .run_task(&mut cc, &mut link)
    .unwrap();
  assert_eq!(report.frames, 3);
  assert_eq!(report.segments, 180);
  assert_eq!(link.frames.len(), 3);
  assert_eq!(cc.acquisition().remote().calls().len(), 3);
}

#[test]
fn test_continuous_task_async_mode() {
  let (mut cc, mut link, _) = Harness::new()
    .remote(|remote| remote.with_synthetic(320, 200))
    .init();

  let report = ContinuousTask::default()
    .with_frame_number(Some(2))
    .with_mode(CallMode::Async)
    .run_task(&mut cc, &mut link)
    .unwrap();
  assert_eq!(report.frames, 2);
  assert_eq!(report.segments, 120);
  assert!(
    cc.acquisition()
      .remote()
      .calls()
      .iter()
      .all(|call| call.mode == CallMode::Async)
  );
}

#[test]
fn test_continuous_task_propagates_remote_failure() {
  let (mut cc, mut link, _) = Harness::new()
    .remote(|remote| remote.failing(-3))
    .init();

  let result = ContinuousTask::default()
    .with_frame_number(Some(5))
    .run_task(&mut cc, &mut link);
  assert!(result.is_err());
  assert!(link.frames.is_empty());
}
