// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/output/record_jsonl.rs - 指令记录输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use thiserror::Error;

use crate::output::Actuate;
use crate::servo::VelocityCommand;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum CommandRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 把每条已发布指令记成一行带时间戳的 JSON，用于离线核对控制行为。
/// 用法: `jsonl:///path/to/cmd.jsonl`，带 `?append` 追加到已有文件。
pub struct CommandRecordOutput {
  writer: Mutex<BufWriter<File>>,
}

impl FromUrlWithScheme for CommandRecordOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for CommandRecordOutput {
  type Error = CommandRecordOutputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(CommandRecordOutputError::SchemeMismatch);
    }

    let append = url.query_pairs().any(|(key, _)| key == "append");
    let path = PathBuf::from(url.path());
    let file = if append {
      OpenOptions::new().create(true).append(true).open(path)?
    } else {
      File::create(path)?
    };

    Ok(Self {
      writer: Mutex::new(BufWriter::new(file)),
    })
  }
}

impl Actuate for CommandRecordOutput {
  type Error = CommandRecordOutputError;

  fn publish(&self, command: &VelocityCommand) -> Result<(), Self::Error> {
    let record = serde_json::json!({
      "stamp": Utc::now().to_rfc3339(),
      "linear": { "x": command.linear_x, "y": 0.0, "z": 0.0 },
      "angular": { "x": 0.0, "y": 0.0, "z": command.angular_z },
    });

    let mut writer = self.writer.lock().unwrap();
    serde_json::to_writer(&mut *writer, &record)?;
    writer.write_all(b"\n")?;
    // 指令频率很低，逐条落盘方便现场跟看
    writer.flush()?;
    Ok(())
  }
}
