// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/output/log_command.rs - 日志指令输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use thiserror::Error;
use tracing::info;

use crate::output::Actuate;
use crate::servo::VelocityCommand;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum LogCommandOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 把速度指令写进结构化日志，联调底盘之前的默认执行器。
/// 用法: `log://-`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCommandOutput;

impl FromUrlWithScheme for LogCommandOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogCommandOutput {
  type Error = LogCommandOutputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogCommandOutputError::SchemeMismatch);
    }
    Ok(Self)
  }
}

impl Actuate for LogCommandOutput {
  type Error = LogCommandOutputError;

  fn publish(&self, command: &VelocityCommand) -> Result<(), Self::Error> {
    info!(
      "发布速度指令: linear.x = {:.3}, angular.z = {:.4}",
      command.linear_x, command.angular_z
    );
    Ok(())
  }
}
