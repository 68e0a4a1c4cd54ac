// 该文件是 Shanan （山南西风） 项目的一部分。
// src/conncomp.rs - 颜色连通域模块
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
  acquire::{Acquisition, Camera, FetchOutcome},
  calibrate::{BlobEngine, PointReport, SignatureCalibrator},
  config::CcConfig,
  context::CcContext,
  error::CcError,
  frame::{Point16, RawFrame, RectA},
  lut::LutLoader,
  proc_table::{self, ArgValue, CC_PROCEDURES, ProcEntry, Procedure},
  queue::SegmentQueue,
  rpc::{CallMode, HostLink, RemoteCore},
  serialize::FrameBuffer,
  store::{CalibrationStore, ParamStore},
};

/// 初始化所需的外部协作者
pub struct ConnCompParts<S, E, R, C> {
  pub store: S,
  pub engine: E,
  pub remote: R,
  pub camera: C,
  /// 与像素核共享的分段队列
  pub queue: SegmentQueue,
}

pub struct ConnComp<S, E, R, C> {
  config: CcConfig,
  ctx: CcContext,
  store: CalibrationStore<S>,
  calibrator: SignatureCalibrator<E>,
  acquisition: Acquisition<R, C>,
  buffer: FrameBuffer,
}

impl<S, E, R, C> ConnComp<S, E, R, C>
where
  S: ParamStore,
  E: BlobEngine,
  R: RemoteCore,
  C: Camera,
{
  /// 注册过程表、解析像素核过程、补齐默认签名并加载查找表
  pub fn init(
    config: CcConfig,
    parts: ConnCompParts<S, E, R, C>,
    link: &mut dyn HostLink,
  ) -> Result<Self, CcError> {
    let ConnCompParts {
      store,
      engine,
      remote,
      camera,
      queue,
    } = parts;

    link.register_module(CC_PROCEDURES)?;
    let acquisition = Acquisition::bind(remote, camera)?;

    let mut store = CalibrationStore::new(store);
    store.ensure_defaults()?;

    let mut ctx = CcContext::new(queue);
    if let Err(err) = LutLoader.reload(&mut ctx, &store) {
      // 查找表保持清空状态，下一次取帧时重试
      warn!("初始化时加载查找表失败: {}", err);
    }

    info!(
      "连通域模块初始化完成: {}x{}，输出缓冲区 {} 字节",
      config.frame_width, config.frame_height, config.buffer_capacity
    );

    Ok(Self {
      buffer: FrameBuffer::with_capacity(config.buffer_capacity),
      config,
      ctx,
      store,
      calibrator: SignatureCalibrator::new(engine),
      acquisition,
    })
  }

  pub fn config(&self) -> &CcConfig {
    &self.config
  }

  pub fn context(&self) -> &CcContext {
    &self.ctx
  }

  pub fn store(&self) -> &CalibrationStore<S> {
    &self.store
  }

  pub fn engine(&self) -> &E {
    self.calibrator.engine()
  }

  pub fn acquisition(&self) -> &Acquisition<R, C> {
    &self.acquisition
  }

  pub fn acquisition_mut(&mut self) -> &mut Acquisition<R, C> {
    &mut self.acquisition
  }

  /// 相机子系统交来一帧原始图像，供标定使用
  pub fn capture_raw_frame(&mut self, frame: RawFrame) {
    debug!("收到原始帧 {}x{}", frame.width(), frame.height());
    self.ctx.set_raw_frame(frame);
  }

  pub fn reload_lut(&mut self) -> Result<(), CcError> {
    LutLoader.reload(&mut self.ctx, &self.store)
  }

  pub fn set_sig_region(&mut self, slot: u8, region: RectA) -> Result<u8, CcError> {
    self
      .calibrator
      .calibrate_region(&mut self.ctx, &mut self.store, slot, region)
  }

  pub fn set_sig_point(
    &mut self,
    slot: u8,
    point: Point16,
    link: Option<&mut dyn HostLink>,
  ) -> Result<u8, CcError> {
    let (width, height) = (self.config.frame_width, self.config.frame_height);
    let report = link.map(|link| PointReport {
      buffer: &mut self.buffer,
      link,
      width,
      height,
    });
    self
      .calibrator
      .calibrate_point(&mut self.ctx, &mut self.store, slot, point, report)
  }

  /// 同步获取一帧 CCQ1 并发送，返回像素核的结果
  pub fn get_rls_frame(&mut self, link: &mut dyn HostLink, render_flags: u8) -> Result<i32, CcError> {
    let result = match self.reserve_and_fetch(CallMode::Sync)? {
      FetchOutcome::Completed(result) => result,
      FetchOutcome::Pending => 0,
    };
    self.send_segment_frame(link, render_flags)?;
    Ok(result)
  }

  /// 发出异步取帧，立即返回；分段由 [`Self::collect_rls_frame`] 读出
  pub fn request_rls_frame_async(&mut self) -> Result<(), CcError> {
    self.reserve_and_fetch(CallMode::Async)?;
    Ok(())
  }

  /// 读出异步取帧产生的分段并发送，返回分段数。
  ///
  /// 没有等待中的异步取帧时不发送任何帧。
  pub fn collect_rls_frame(
    &mut self,
    link: &mut dyn HostLink,
    render_flags: u8,
  ) -> Result<u32, CcError> {
    if !self.acquisition.complete() {
      self.buffer.release();
      return Err(CcError::InvalidArgument(
        "没有等待中的异步取帧".to_string(),
      ));
    }
    self.send_segment_frame(link, render_flags)
  }

  /// 预留 CCQ1 帧头后取帧；取帧失败时放弃预留
  fn reserve_and_fetch(&mut self, mode: CallMode) -> Result<FetchOutcome, CcError> {
    let offset = self.buffer.begin_segment_frame()?;
    let addr = self.buffer.addr_at(offset);
    let outcome = self
      .acquisition
      .fetch(&mut self.ctx, &self.store, addr, mode);
    if outcome.is_err() {
      debug!("取帧失败，放弃预留的帧头");
      self.buffer.release();
    }
    outcome
  }

  fn send_segment_frame(
    &mut self,
    link: &mut dyn HostLink,
    render_flags: u8,
  ) -> Result<u32, CcError> {
    let count = self.buffer.finish_segment_frame(
      self.ctx.queue(),
      render_flags,
      self.config.frame_width,
      self.config.frame_height,
    )?;
    link.use_buffer(self.buffer.as_bytes())?;
    Ok(count)
  }

  /// 按过程表分发主机调用，返回 RPC 状态码
  pub fn dispatch(&mut self, name: &str, args: &[ArgValue], link: &mut dyn HostLink) -> i32 {
    let Some(entry) = proc_table::lookup(name) else {
      warn!("未知过程: {}", name);
      return CcError::InvalidArgument(name.to_string()).status();
    };
    match self.invoke(entry, args, link) {
      Ok(value) => value,
      Err(err) => {
        warn!("过程 {} 执行失败: {}", name, err);
        err.status()
      }
    }
  }

  fn invoke(
    &mut self,
    entry: &ProcEntry,
    args: &[ArgValue],
    link: &mut dyn HostLink,
  ) -> Result<i32, CcError> {
    entry.check_args(args)?;
    match (entry.procedure, args) {
      (Procedure::GetRlsFrame, []) => {
        let flags = self.config.render_flags;
        self.get_rls_frame(link, flags)
      }
      (Procedure::SetSigRegion, [ArgValue::U8(slot), ArgValue::Region(region)]) => {
        self.set_sig_region(*slot, *region).map(i32::from)
      }
      (Procedure::SetSigPoint, [ArgValue::U8(slot), ArgValue::Point(point)]) => self
        .set_sig_point(*slot, *point, Some(&mut *link))
        .map(i32::from),
      (Procedure::SetMemory, [ArgValue::U32(location), ArgValue::Bytes(data)]) => {
        warn!("cc_setMemory 写入 0x{:08x}，{} 字节", location, data.len());
        // SAFETY: 该过程是主机调试后门，地址有效性由主机负责
        Ok(unsafe { proc_table::set_memory(*location as usize, data) })
      }
      _ => Err(CcError::InvalidArgument(entry.name.to_string())),
    }
  }
}
