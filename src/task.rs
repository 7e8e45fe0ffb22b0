// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/task.rs - 控制循环与任务
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

use std::{thread, time::Duration};

use tracing::{debug, info, warn};

use crate::admission;
use crate::marking::{AlignmentTracker, Localize, MarkedObject, MarkedObjects, NoopLocalizer};
use crate::observation::ObservationFrame;
use crate::output::Actuate;
use crate::servo::{CenteringController, VelocityCommand};

/// 一个控制周期的结论。
/// 只有 `Steered` 会产生一条待发布的速度指令。
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
  /// 本周期没有检测目标，保持待机
  NoDetection,
  /// 有目标但不满足标记条件（类别未知或已标记）
  NotAdmitted { class_id: u32 },
  /// 目标受理，完成一次对中计算
  Steered {
    class_id: u32,
    label: &'static str,
    command: VelocityCommand,
    aligned: bool,
  },
}

/// 每条观测执行一轮：准入判定 → 对中计算 → 对准状态更新 → 定位交接。
///
/// 单写者模型：MarkedObjects 与对准状态只在 `cycle` 内被修改。
pub struct ControlLoop<L = NoopLocalizer> {
  controller: CenteringController,
  localizer: L,
  marked: MarkedObjects,
  tracker: AlignmentTracker,
}

impl ControlLoop<NoopLocalizer> {
  pub fn new(controller: CenteringController) -> Self {
    Self::with_localizer(controller, NoopLocalizer)
  }
}

impl<L> ControlLoop<L>
where
  L: Localize,
  L::Error: std::error::Error,
{
  pub fn with_localizer(controller: CenteringController, localizer: L) -> Self {
    Self {
      controller,
      localizer,
      marked: MarkedObjects::new(),
      tracker: AlignmentTracker::default(),
    }
  }

  pub fn marked(&self) -> &MarkedObjects {
    &self.marked
  }

  pub fn is_aligned(&self) -> bool {
    self.tracker.is_aligned()
  }

  pub fn cycle(&mut self, frame: &ObservationFrame) -> CycleOutcome {
    let detection = match frame.detection() {
      Some(detection) => detection,
      None => return CycleOutcome::NoDetection,
    };

    let class = match admission::admit(Some(&detection), &self.marked) {
      Some(class) => class,
      None => {
        return CycleOutcome::NotAdmitted {
          class_id: detection.class_id,
        };
      }
    };

    info!("检测到新目标: {} ({})", detection.class_id, class.label());
    debug!(
      "目标在图像中的位置: ({}, {})",
      detection.offset_x, detection.offset_y
    );

    let steering = self.controller.steer(&detection);
    self.tracker.record(steering.converged);

    if steering.converged {
      match self.localizer.locate(&detection) {
        Ok(Some(pose)) => {
          info!(
            "标志 {} ({}) 已定位: ({:.2}, {:.2})",
            detection.class_id,
            class.label(),
            pose.x,
            pose.y
          );
          self.marked.insert(detection.class_id, MarkedObject { class, pose });
        }
        // 定位条件尚未就绪，下个周期重试
        Ok(None) => {}
        Err(error) => warn!("定位失败，跳过本周期标记: {}", error),
      }
    }

    CycleOutcome::Steered {
      class_id: detection.class_id,
      label: class.label(),
      command: steering.command,
      aligned: steering.converged,
    }
  }
}

pub trait Task<I, C, O>: Sized {
  type Error;
  fn run_task(self, input: I, control: C, output: O) -> Result<(), Self::Error>;
}

/// 取一条观测，跑一个周期就结束，用于联调单条消息
pub struct OneShotTask;

impl<I, L, O, OE> Task<I, ControlLoop<L>, O> for OneShotTask
where
  I: Iterator<Item = ObservationFrame>,
  L: Localize,
  L::Error: std::error::Error,
  O: Actuate<Error = OE>,
  OE: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, mut control: ControlLoop<L>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入观测"))?;
    match control.cycle(&frame) {
      CycleOutcome::NoDetection => info!("本周期无检测目标"),
      CycleOutcome::NotAdmitted { class_id } => {
        info!("目标 {} 不满足标记条件", class_id);
      }
      CycleOutcome::Steered {
        class_id,
        label,
        command,
        aligned,
      } => {
        output.publish(&command)?;
        info!(
          "目标 {} ({}) 指令已发布, 对准: {}",
          class_id, label, aligned
        );
      }
    }

    Ok(())
  }
}

/// 持续消费观测流，进程生命周期内一条消息跑一个周期。
/// 中断信号只在周期之间生效，不会打断正在处理的观测。
#[derive(Default, Debug)]
pub struct ContinuousTask {
  cycle_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_cycle_number(mut self, cycle_number: Option<usize>) -> Self {
    self.cycle_number = cycle_number;
    self
  }
}

impl<I, L, O, OE> Task<I, ControlLoop<L>, O> for ContinuousTask
where
  I: Iterator<Item = ObservationFrame>,
  L: Localize,
  L::Error: std::error::Error,
  O: Actuate<Error = OE>,
  OE: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, mut control: ControlLoop<L>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })
    .expect("Error setting Ctrl-C handler");

    let mut cycle_index = 0;
    for frame in input {
      cycle_index = (cycle_index + 1) % usize::MAX;
      debug!("处理第 {} 条观测", cycle_index);
      match control.cycle(&frame) {
        CycleOutcome::NoDetection => debug!("本周期无检测目标"),
        CycleOutcome::NotAdmitted { class_id } => {
          debug!("目标 {} 不满足标记条件", class_id);
        }
        CycleOutcome::Steered {
          class_id,
          label,
          command,
          aligned,
        } => {
          if let Err(error) = output.publish(&command) {
            // 执行器故障不终止控制循环
            warn!("指令发布失败: {}", error);
          }
          if aligned {
            info!("目标 {} ({}) 已对准", class_id, label);
          }
        }
      }
      if self.cycle_number.map(|n| cycle_index >= n).unwrap_or(false) {
        info!("达到指定周期数 {}, 退出控制循环", cycle_index);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出控制循环");
        break;
      }
    }

    info!("任务完成，退出");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::observation::{FIELD_CLASS_ID, FIELD_COUNT, FIELD_OFFSET_X, FIELD_WIDTH};
  use crate::servo::ServoConfig;

  fn frame_with(seq: u64, class_id: f32, width: f32, offset_x: f32) -> ObservationFrame {
    let mut data = vec![0.0f32; FIELD_COUNT];
    data[FIELD_CLASS_ID] = class_id;
    data[FIELD_WIDTH] = width;
    data[FIELD_OFFSET_X] = offset_x;
    ObservationFrame::new(seq, data)
  }

  fn control_loop() -> ControlLoop {
    let controller =
      CenteringController::new(ServoConfig::default()).expect("default config is valid");
    ControlLoop::new(controller)
  }

  #[test]
  fn empty_frame_keeps_the_loop_idle() {
    let mut control = control_loop();
    assert_eq!(
      control.cycle(&ObservationFrame::empty(1)),
      CycleOutcome::NoDetection
    );
    assert!(!control.is_aligned());
  }

  #[test]
  fn sentinel_class_id_in_the_frame_itself_is_not_admitted() {
    // 哨兵判断必须针对当前观测自身的类别字段
    let mut control = control_loop();
    let frame = frame_with(1, -1.0, 10.0, 0.0);
    assert_eq!(control.cycle(&frame), CycleOutcome::NoDetection);
  }

  #[test]
  fn unknown_class_is_not_admitted() {
    let mut control = control_loop();
    let outcome = control.cycle(&frame_with(1, 8.0, 10.0, 0.0));
    assert_eq!(outcome, CycleOutcome::NotAdmitted { class_id: 8 });
  }

  #[test]
  fn admitted_class_steers_and_reports_convergence() {
    let mut control = control_loop();
    // 目标中心 (630 + 10) / 2 = 320, 误差 0 → 对准
    let outcome = control.cycle(&frame_with(1, 7.0, 10.0, 630.0));
    match outcome {
      CycleOutcome::Steered {
        class_id,
        label,
        command,
        aligned,
      } => {
        assert_eq!(class_id, 7);
        assert_eq!(label, "radioactive");
        assert_eq!(command, VelocityCommand::stop());
        assert!(aligned);
      }
      other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(control.is_aligned());
    // 占位定位器不会写入标记集合
    assert!(control.marked().is_empty());
  }

  #[test]
  fn alignment_state_is_overwritten_by_the_next_cycle() {
    let mut control = control_loop();
    control.cycle(&frame_with(1, 7.0, 10.0, 630.0));
    assert!(control.is_aligned());
    control.cycle(&frame_with(2, 7.0, 10.0, 0.0));
    assert!(!control.is_aligned());
  }
}
