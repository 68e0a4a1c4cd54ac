// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/calibration_tests.rs - 签名标定与查找表重建
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

use std::sync::Arc;

use common::{Harness, ProbeStore, red_model};
use shanan_cc::{
  CcError, NUM_MODELS,
  context::{CcContext, LutState},
  error::{STATUS_INVALID_ARGUMENT, STATUS_NO_INPUT},
  frame::{BlobA, Point16, RawFrame, RectA},
  lut::{ColorModel, LutLoader},
  queue::{Qval, SegmentQueue},
  serialize::{CCB1, FrameHeader, RENDER_FLAG_BLEND_BG, RENDER_FLAG_FLUSH, decode_blobs},
  sim::{FixedEngine, RecordingLink},
  store::{CalibrationStore, MemoryStore, ParamStore, signature_key},
};

#[test]
fn test_init_creates_seven_zero_signatures() {
  let (cc, link, _) = Harness::new().init();

  assert_eq!(cc.store().inner().len(), NUM_MODELS as usize);
  for slot in 1..=NUM_MODELS {
    let model = cc.store().read(slot).unwrap();
    assert!(model.is_zero());
  }
  assert_eq!(cc.context().lut_state(), LutState::Loaded);
  assert!(cc.context().lut().is_empty());
  assert_eq!(
    link.registered,
    vec![
      "cc_getRLSFrame",
      "cc_setSigRegion",
      "cc_setSigPoint",
      "cc_setMemory"
    ]
  );
}

#[test]
fn test_ensure_defaults_keeps_existing_records() {
  let mut store = CalibrationStore::new(MemoryStore::new());
  store.write(2, &red_model()).unwrap();

  assert_eq!(store.ensure_defaults().unwrap(), NUM_MODELS as usize - 1);
  assert_eq!(store.ensure_defaults().unwrap(), 0);
  assert_eq!(store.read(2).unwrap(), red_model());
  assert_eq!(store.inner().len(), NUM_MODELS as usize);
}

#[test]
fn test_calibrate_region_then_reload() {
  let pixels: Arc<[u8]> = vec![0u8; 320 * 200].into();
  let store = ProbeStore::watching(pixels.clone());
  let reads = store.reads.clone();
  let (mut cc, _link, _) = Harness::with_store(store)
    .engine(FixedEngine::new(red_model(), 85))
    .init();
  assert_eq!(reads.get(), NUM_MODELS as usize);

  cc.capture_raw_frame(RawFrame::new(320, 200, pixels).unwrap());
  assert!(cc.context().is_stale());

  let score = cc.set_sig_region(3, RectA::new(10, 10, 20, 20)).unwrap();
  assert_eq!(score, 85);
  assert_eq!(cc.engine().fits(), 1);
  assert_eq!(cc.context().lut_state(), LutState::Stale);
  assert_eq!(cc.store().read(3).unwrap(), red_model());

  reads.set(0);
  cc.reload_lut().unwrap();
  assert_eq!(reads.get(), NUM_MODELS as usize);

  let ctx = cc.context();
  assert!(ctx.raw_frame().is_none());
  let lut = ctx.loaded_lut().expect("查找表应已加载");
  assert_eq!(lut.model(3), Some(&red_model()));
  assert_eq!(lut.model(1), Some(&ColorModel::default()));
  assert_eq!(lut.loaded_models(), NUM_MODELS as usize);
}

#[test]
fn test_reload_drops_raw_frame_before_reading() {
  let pixels: Arc<[u8]> = vec![7u8; 320 * 200].into();
  let store = ProbeStore::watching(pixels.clone());
  let owners = store.owners_at_read.clone();
  let (mut cc, _link, _) = Harness::with_store(store).init();

  cc.capture_raw_frame(RawFrame::new(320, 200, pixels).unwrap());
  owners.borrow_mut().clear();
  cc.reload_lut().unwrap();

  let owners = owners.borrow();
  assert_eq!(owners.len(), NUM_MODELS as usize);
  // 只剩探针自己持有像素
  assert!(owners.iter().all(|count| *count == 1));
}

#[test]
fn test_reload_fails_on_missing_signature() {
  let queue = SegmentQueue::with_capacity(8);
  let mut ctx = CcContext::new(queue.clone());
  let mut store = CalibrationStore::new(MemoryStore::new());
  store.write(1, &red_model()).unwrap();
  ctx.set_raw_frame(RawFrame::zeroed(8, 8));
  queue.push(Qval::segment(1, 0, 4));

  let err = LutLoader.reload(&mut ctx, &store).unwrap_err();
  assert!(matches!(err, CcError::NotFound(ref key) if *key == signature_key(2)));
  assert_eq!(ctx.lut_state(), LutState::Stale);
  assert!(ctx.lut().is_empty());
  assert_eq!(ctx.lut().loaded_models(), 0);
  assert!(ctx.raw_frame().is_none());
  // 失败时不触碰队列
  assert_eq!(queue.len(), 1);

  store.ensure_defaults().unwrap();
  LutLoader.reload(&mut ctx, &store).unwrap();
  assert_eq!(ctx.lut_state(), LutState::Loaded);
  assert!(queue.is_empty());
}

#[test]
fn test_invalid_slot_leaves_store_untouched() {
  let (mut cc, _link, _) = Harness::new().init();
  cc.capture_raw_frame(RawFrame::zeroed(320, 200));

  for slot in [0, NUM_MODELS + 1] {
    let err = cc.set_sig_region(slot, RectA::new(0, 0, 8, 8)).unwrap_err();
    assert!(matches!(err, CcError::InvalidArgument(_)));
    assert_eq!(err.status(), STATUS_INVALID_ARGUMENT);
  }
  assert_eq!(cc.engine().fits(), 0);
  assert!(cc.context().raw_frame().is_some());
  for slot in 1..=NUM_MODELS {
    assert!(cc.store().read(slot).unwrap().is_zero());
  }
}

#[test]
fn test_calibration_without_raw_frame() {
  let (mut cc, _link, _) = Harness::new().init();

  let err = cc.set_sig_region(1, RectA::new(0, 0, 8, 8)).unwrap_err();
  assert!(matches!(err, CcError::NoInput));
  assert_eq!(err.status(), STATUS_NO_INPUT);

  let err = cc.set_sig_point(1, Point16::new(4, 4), None).unwrap_err();
  assert!(matches!(err, CcError::NoInput));
  assert_eq!(cc.engine().fits(), 0);
}

#[test]
fn test_engine_error_does_not_persist() {
  let (mut cc, _link, _) = Harness::new().init();
  cc.capture_raw_frame(RawFrame::zeroed(32, 32));

  let err = cc.set_sig_region(5, RectA::new(20, 20, 30, 30)).unwrap_err();
  assert!(matches!(err, CcError::Engine(-2)));
  assert!(cc.store().read(5).unwrap().is_zero());
}

#[test]
fn test_point_calibration_reports_blob() {
  let (mut cc, _, _) = Harness::new().init();
  let mut link = RecordingLink::new();
  cc.capture_raw_frame(RawFrame::zeroed(320, 200));

  let score = cc
    .set_sig_point(4, Point16::new(50, 60), Some(&mut link))
    .unwrap();
  assert_eq!(score, 80);
  assert_eq!(cc.store().read(4).unwrap(), FixedEngine::default_model());

  let frame = link.last_frame().expect("应回报一帧色块");
  let header = FrameHeader::decode(frame).unwrap();
  assert_eq!(header.tag, CCB1);
  assert_eq!(header.render_flags, RENDER_FLAG_FLUSH | RENDER_FLAG_BLEND_BG);
  assert_eq!((header.width, header.height), (320, 200));
  assert_eq!(header.count as usize, BlobA::WIRE_WORDS);
  assert_eq!(
    decode_blobs(frame).unwrap(),
    vec![BlobA::from_region(4, &RectA::new(42, 52, 16, 16))]
  );
}

#[test]
fn test_point_calibration_clips_to_frame() {
  let (mut cc, _, _) = Harness::new()
    .engine(FixedEngine::default().with_grow(10))
    .init();
  let mut link = RecordingLink::new();
  cc.capture_raw_frame(RawFrame::zeroed(320, 200));

  cc.set_sig_point(1, Point16::new(318, 1), Some(&mut link))
    .unwrap();
  let blobs = decode_blobs(link.last_frame().unwrap()).unwrap();
  assert_eq!(blobs[0], BlobA::from_region(1, &RectA::new(313, 0, 7, 10)));
}

#[test]
fn test_json_store_survives_reopen() {
  use shanan_cc::store::JsonFileStore;

  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("params.json");
  {
    let store = JsonFileStore::open(&path).unwrap();
    let (mut cc, _link, _) = Harness::with_store(store)
      .engine(FixedEngine::new(red_model(), 90))
      .init();
    cc.capture_raw_frame(RawFrame::zeroed(320, 200));
    cc.set_sig_region(6, RectA::new(0, 0, 10, 10)).unwrap();
  }

  let store = JsonFileStore::open(&path).unwrap();
  assert!(store.get(&signature_key(6)).unwrap().is_some());
  let (cc, _link, _) = Harness::with_store(store).init();
  assert_eq!(cc.context().lut().model(6), Some(&red_model()));
}
