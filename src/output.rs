// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/output.rs - 速度指令输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use thiserror::Error;
use url::Url;

use crate::FromUrl;
use crate::servo::VelocityCommand;

/// 速度指令的执行器接口。
///
/// 每个受理周期恰好发布一次，收敛时的零指令同样发布，
/// 不做“仅在变化时发布”的抑制。
pub trait Actuate: Sized {
  type Error;
  fn publish(&self, command: &VelocityCommand) -> Result<(), Self::Error>;
}

#[cfg(feature = "log_command")]
mod log_command;
#[cfg(feature = "log_command")]
pub use self::log_command::{LogCommandOutput, LogCommandOutputError};

#[cfg(feature = "record_jsonl")]
mod record_jsonl;
#[cfg(feature = "record_jsonl")]
pub use self::record_jsonl::{CommandRecordOutput, CommandRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "log_command")]
  #[error("日志输出错误: {0}")]
  LogCommandOutputError(#[from] LogCommandOutputError),
  #[cfg(feature = "record_jsonl")]
  #[error("指令记录输出错误: {0}")]
  CommandRecordOutputError(#[from] CommandRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "log_command")]
  LogCommandOutput(LogCommandOutput),
  #[cfg(feature = "record_jsonl")]
  CommandRecordOutput(CommandRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    use crate::FromUrlWithScheme;

    match url.scheme() {
      #[cfg(feature = "log_command")]
      LogCommandOutput::SCHEME => {
        let output = LogCommandOutput::from_url(url)?;
        Ok(OutputWrapper::LogCommandOutput(output))
      }
      #[cfg(feature = "record_jsonl")]
      CommandRecordOutput::SCHEME => {
        let output = CommandRecordOutput::from_url(url)?;
        Ok(OutputWrapper::CommandRecordOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Actuate for OutputWrapper {
  type Error = OutputError;

  fn publish(&self, command: &VelocityCommand) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "log_command")]
      OutputWrapper::LogCommandOutput(output) => {
        output.publish(command).map_err(OutputError::from)
      }
      #[cfg(feature = "record_jsonl")]
      OutputWrapper::CommandRecordOutput(output) => {
        output.publish(command).map_err(OutputError::from)
      }
    }
  }
}
