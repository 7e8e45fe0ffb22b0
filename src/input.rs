// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/input.rs - 观测输入
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

use crate::FromUrl;
use crate::observation::ObservationFrame;

#[cfg(feature = "jsonl_replay")]
mod jsonl_replay;
#[cfg(feature = "jsonl_replay")]
pub use self::jsonl_replay::{JsonlReplayInput, JsonlReplayInputError};

#[cfg(feature = "stdin_stream")]
mod stdin_stream;
#[cfg(feature = "stdin_stream")]
pub use self::stdin_stream::{StdinStreamInput, StdinStreamInputError};

/// 单行观测文本的解析错误
#[derive(Error, Debug)]
pub enum ObservationLineError {
  #[error("JSON 解析失败: {0}")]
  Json(#[from] serde_json::Error),
  #[error("消息里没有 data 数组字段")]
  MissingData,
  #[error("data 数组含非数值字段")]
  NonNumericField,
}

/// 解析一行观测文本。
///
/// 视觉管线的记录器会输出两种形态：裸数值数组，或带 `data` 数组字段的对象，
/// 两种都接受。
pub fn parse_observation_line(
  seq: u64,
  line: &str,
) -> Result<ObservationFrame, ObservationLineError> {
  let value: serde_json::Value = serde_json::from_str(line)?;
  let fields = match &value {
    serde_json::Value::Array(fields) => fields,
    serde_json::Value::Object(message) => message
      .get("data")
      .and_then(|data| data.as_array())
      .ok_or(ObservationLineError::MissingData)?,
    _ => return Err(ObservationLineError::MissingData),
  };

  let mut data = Vec::with_capacity(fields.len());
  for field in fields {
    let number = field
      .as_f64()
      .ok_or(ObservationLineError::NonNumericField)?;
    data.push(number as f32);
  }
  Ok(ObservationFrame::new(seq, data))
}

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "jsonl_replay")]
  #[error("JSON 行回放输入错误: {0}")]
  JsonlReplayInputError(#[from] JsonlReplayInputError),
  #[cfg(feature = "stdin_stream")]
  #[error("标准输入流错误: {0}")]
  StdinStreamInputError(#[from] StdinStreamInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum InputWrapper {
  #[cfg(feature = "jsonl_replay")]
  JsonlReplay(JsonlReplayInput),
  #[cfg(feature = "stdin_stream")]
  StdinStream(StdinStreamInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "jsonl_replay")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonlReplayInput::SCHEME {
        let input = JsonlReplayInput::from_url(url)?;
        return Ok(InputWrapper::JsonlReplay(input));
      }
    }
    #[cfg(feature = "stdin_stream")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == StdinStreamInput::SCHEME {
        let input = StdinStreamInput::from_url(url)?;
        return Ok(InputWrapper::StdinStream(input));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl Iterator for InputWrapper {
  type Item = ObservationFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "jsonl_replay")]
      InputWrapper::JsonlReplay(input) => input.next(),
      #[cfg(feature = "stdin_stream")]
      InputWrapper::StdinStream(input) => input.next(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::observation::{FIELD_CLASS_ID, FIELD_OFFSET_X};

  #[test]
  fn bare_array_lines_parse() {
    let frame = parse_observation_line(
      1,
      "[7, 10, 20, 0, 0, 0, 0, 0, 0, 315, 100]",
    )
    .expect("line should parse");
    assert_eq!(frame.seq, 1);
    assert_eq!(frame.data[FIELD_CLASS_ID], 7.0);
    assert_eq!(frame.data[FIELD_OFFSET_X], 315.0);
  }

  #[test]
  fn object_lines_with_data_field_parse() {
    let frame = parse_observation_line(
      2,
      r#"{"stamp": 12.5, "data": [11, 30, 30, 0, 0, 0, 0, 0, 0, 120, 80]}"#,
    )
    .expect("line should parse");
    assert_eq!(frame.data.len(), 11);
    assert_eq!(frame.data[FIELD_CLASS_ID], 11.0);
  }

  #[test]
  fn empty_array_means_no_detection() {
    let frame = parse_observation_line(3, "[]").expect("line should parse");
    assert_eq!(frame.detection(), None);
  }

  #[test]
  fn malformed_lines_are_rejected() {
    assert!(matches!(
      parse_observation_line(4, "not json"),
      Err(ObservationLineError::Json(_))
    ));
    assert!(matches!(
      parse_observation_line(5, r#"{"objects": []}"#),
      Err(ObservationLineError::MissingData)
    ));
    assert!(matches!(
      parse_observation_line(6, r#"[7, "wide"]"#),
      Err(ObservationLineError::NonNumericField)
    ));
  }
}
