// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/common/mod.rs - 集成测试共用的构造与探针
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

#![allow(dead_code)]

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  sync::Arc,
};

use shanan_cc::{
  ConnComp,
  config::CcConfig,
  conncomp::ConnCompParts,
  lut::{ColorModel, Line},
  queue::SegmentQueue,
  sim::{FixedEngine, RecordingLink, SimCamera, SimPixelCore},
  store::{MemoryStore, ParamStore, StoreError},
};

pub type SimConnComp<S> = ConnComp<S, FixedEngine, SimPixelCore, SimCamera>;

/// 记录每次读取，并在读取时记下被观察缓冲区的持有者数量
#[derive(Default)]
pub struct ProbeStore {
  inner: MemoryStore,
  watched: Option<Arc<[u8]>>,
  pub reads: Rc<Cell<usize>>,
  pub owners_at_read: Rc<RefCell<Vec<usize>>>,
}

impl ProbeStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn watching(pixels: Arc<[u8]>) -> Self {
    Self {
      watched: Some(pixels),
      ..Self::default()
    }
  }
}

impl ParamStore for ProbeStore {
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    self.reads.set(self.reads.get() + 1);
    if let Some(pixels) = &self.watched {
      self
        .owners_at_read
        .borrow_mut()
        .push(Arc::strong_count(pixels));
    }
    self.inner.get(key)
  }

  fn add(&mut self, key: &str, desc: &str, value: &[u8]) -> Result<bool, StoreError> {
    self.inner.add(key, desc, value)
  }

  fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
    self.inner.set(key, value)
  }
}

pub fn red_model() -> ColorModel {
  ColorModel::from_lines([
    Line::new(0.5, 2.0),
    Line::new(0.5, 12.0),
    Line::new(-1.0, -20.0),
    Line::new(-1.0, 20.0),
  ])
}

pub struct Harness<S: ParamStore> {
  pub config: CcConfig,
  pub store: S,
  pub engine: FixedEngine,
  pub camera: SimCamera,
  pub queue: SegmentQueue,
  pub remote: SimPixelCore,
}

impl Harness<MemoryStore> {
  pub fn new() -> Self {
    Harness::with_store(MemoryStore::new())
  }
}

impl<S: ParamStore> Harness<S> {
  pub fn with_store(store: S) -> Self {
    let config = CcConfig::default();
    let queue = SegmentQueue::with_capacity(config.queue_capacity);
    Self {
      remote: SimPixelCore::new(queue.clone()),
      config,
      store,
      engine: FixedEngine::default(),
      camera: SimCamera::new(),
      queue,
    }
  }

  pub fn config(mut self, config: CcConfig) -> Self {
    self.queue = SegmentQueue::with_capacity(config.queue_capacity);
    self.remote = SimPixelCore::new(self.queue.clone());
    self.config = config;
    self
  }

  pub fn engine(mut self, engine: FixedEngine) -> Self {
    self.engine = engine;
    self
  }

  pub fn camera(mut self, camera: SimCamera) -> Self {
    self.camera = camera;
    self
  }

  pub fn remote<F>(mut self, build: F) -> Self
  where
    F: FnOnce(SimPixelCore) -> SimPixelCore,
  {
    self.remote = build(self.remote);
    self
  }

  pub fn init(self) -> (SimConnComp<S>, RecordingLink, SegmentQueue) {
    let mut link = RecordingLink::new();
    let parts = ConnCompParts {
      store: self.store,
      engine: self.engine,
      remote: self.remote,
      camera: self.camera,
      queue: self.queue.clone(),
    };
    let cc = match ConnComp::init(self.config, parts, &mut link) {
      Ok(cc) => cc,
      Err(err) => panic!("初始化失败: {}", err),
    };
    (cc, link, self.queue)
  }
}
