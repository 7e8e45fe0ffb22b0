// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/servo.rs - 比例对中控制器
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

use crate::observation::Detection;

/// 对中控制参数。
///
/// 默认值按 640 像素宽的画面标定；角速度幅值被限制在
/// `[min_angular, max_angular]` 区间内（原始设计只留了意图注释，
/// 这里落实为必须配置的限幅）。
#[derive(Debug, Clone, PartialEq)]
pub struct ServoConfig {
  /// 图像中心横坐标（像素）
  pub image_center_x: f32,
  /// 死区阈值（像素），误差在死区内视为已对准
  pub deadband_px: f32,
  /// 比例增益
  pub gain: f32,
  /// 角速度幅值下限（rad/s）
  pub min_angular: f32,
  /// 角速度幅值上限（rad/s）
  pub max_angular: f32,
}

impl Default for ServoConfig {
  fn default() -> Self {
    Self {
      image_center_x: 320.0,
      deadband_px: 5.0,
      gain: 0.005,
      min_angular: 0.1,
      max_angular: 3.0,
    }
  }
}

#[derive(Error, Debug)]
pub enum ServoConfigError {
  #[error("死区阈值不能为负: {0}")]
  NegativeDeadband(f32),
  #[error("比例增益必须为正: {0}")]
  NonPositiveGain(f32),
  #[error("角速度限幅区间非法: [{0}, {1}]")]
  InvalidClampRange(f32, f32),
}

impl ServoConfig {
  fn validate(&self) -> Result<(), ServoConfigError> {
    if self.deadband_px < 0.0 {
      return Err(ServoConfigError::NegativeDeadband(self.deadband_px));
    }
    if self.gain <= 0.0 {
      return Err(ServoConfigError::NonPositiveGain(self.gain));
    }
    if self.min_angular < 0.0 || self.min_angular > self.max_angular {
      return Err(ServoConfigError::InvalidClampRange(
        self.min_angular,
        self.max_angular,
      ));
    }
    Ok(())
  }
}

/// 发往底盘的速度指令，本设计中线速度恒为零
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityCommand {
  pub linear_x: f32,
  pub angular_z: f32,
}

impl VelocityCommand {
  pub fn stop() -> Self {
    Self::default()
  }

  pub fn turn(angular_z: f32) -> Self {
    Self {
      linear_x: 0.0,
      angular_z,
    }
  }
}

/// 一次对中计算的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
  pub command: VelocityCommand,
  pub converged: bool,
}

/// 比例对中控制器：把目标的横向像素误差映射为角速度指令。
///
/// 控制器无记忆，每条观测独立计算，周期之间不保留积分或目标状态。
#[derive(Debug, Clone, Default)]
pub struct CenteringController {
  config: ServoConfig,
}

impl CenteringController {
  pub fn new(config: ServoConfig) -> Result<Self, ServoConfigError> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &ServoConfig {
    &self.config
  }

  pub fn steer(&self, detection: &Detection) -> Steering {
    // 下游约定的中心近似: (横向偏移 + 宽度) / 2，死区参数按此标定
    let object_center_x = (detection.offset_x + detection.width) / 2.0;
    let error_x = self.config.image_center_x - object_center_x;

    if error_x.abs() <= self.config.deadband_px {
      return Steering {
        command: VelocityCommand::stop(),
        converged: true,
      };
    }

    let angular = self.config.gain * error_x;
    let magnitude = angular
      .abs()
      .clamp(self.config.min_angular, self.config.max_angular);

    Steering {
      command: VelocityCommand::turn(magnitude.copysign(angular)),
      converged: false,
    }
  }
}
