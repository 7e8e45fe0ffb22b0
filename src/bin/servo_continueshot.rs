// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/bin/servo_continueshot.rs - 持续视觉伺服程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::Result;
use clap::Parser;
use url::Url;

use tracing::info;
use xunbiao::{
  FromUrl,
  servo::{CenteringController, ServoConfig},
  task::{ContinuousTask, ControlLoop, Task},
};

/// Xunbiao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 观测输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 指令输出
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 图像中心横坐标（像素，640 宽画面取 320）
  #[arg(long, default_value = "320.0", value_name = "PIXEL")]
  pub image_center_x: f32,
  /// 死区阈值（像素）
  #[arg(long, default_value = "5.0", value_name = "PIXEL")]
  pub deadband: f32,
  /// 比例增益
  #[arg(long, default_value = "0.005", value_name = "GAIN")]
  pub gain: f32,
  /// 角速度幅值下限 (rad/s)
  #[arg(long, default_value = "0.1", value_name = "RATE")]
  pub min_angular: f32,
  /// 角速度幅值上限 (rad/s)
  #[arg(long, default_value = "3.0", value_name = "RATE")]
  pub max_angular: f32,

  #[arg(long, value_name = "CYCLE_NUMBER")]
  pub cycle_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("观测输入来源: {}", args.input);
  info!("指令输出: {}", args.output);

  let input = xunbiao::input::InputWrapper::from_url(&args.input)?;
  let output = xunbiao::output::OutputWrapper::from_url(&args.output)?;
  let controller = CenteringController::new(ServoConfig {
    image_center_x: args.image_center_x,
    deadband_px: args.deadband,
    gain: args.gain,
    min_angular: args.min_angular,
    max_angular: args.max_angular,
  })?;

  ContinuousTask::default()
    .with_cycle_number(args.cycle_number)
    .run_task(input, ControlLoop::new(controller), output)?;

  Ok(())
}
