// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/input/jsonl_replay.rs - JSON 行回放输入
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

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::input::parse_observation_line;
use crate::observation::ObservationFrame;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum JsonlReplayInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 从 JSON 行文件回放观测，每行一条消息。
/// 用法: `jsonl:///path/to/observations.jsonl`
pub struct JsonlReplayInput {
  reader: BufReader<File>,
  seq: u64,
}

impl FromUrlWithScheme for JsonlReplayInput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonlReplayInput {
  type Error = JsonlReplayInputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonlReplayInputError::SchemeMismatch);
    }

    let path = PathBuf::from(url.path());
    let file = File::open(path)?;
    Ok(Self {
      reader: BufReader::new(file),
      seq: 0,
    })
  }
}

impl Iterator for JsonlReplayInput {
  type Item = ObservationFrame;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let mut line = String::new();
      match self.reader.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(error) => {
          warn!("读取观测文件失败，结束回放: {}", error);
          return None;
        }
      }

      let line = line.trim();
      if line.is_empty() {
        continue;
      }

      self.seq = self.seq.wrapping_add(1);
      match parse_observation_line(self.seq, line) {
        Ok(frame) => return Some(frame),
        Err(error) => {
          // 残缺消息按无目标处理，回放继续
          warn!("观测 {} 解析失败: {}", self.seq, error);
          return Some(ObservationFrame::empty(self.seq));
        }
      }
    }
  }
}
