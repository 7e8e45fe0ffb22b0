// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/observation.rs - 观测帧定义
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

use tracing::warn;

// 视觉管线 objects 数组的固定字段下标，属于外部约定，不可调整
pub const FIELD_CLASS_ID: usize = 0;
pub const FIELD_WIDTH: usize = 1;
pub const FIELD_HEIGHT: usize = 2;
pub const FIELD_OFFSET_X: usize = 9;
pub const FIELD_OFFSET_Y: usize = 10;

/// 一条完整观测至少要覆盖到纵向偏移字段
pub const FIELD_COUNT: usize = FIELD_OFFSET_Y + 1;

/// 视觉管线每个周期发来的一条原始观测消息。
///
/// `data` 为变长数值字段数组，空数组表示本周期没有检测到目标；
/// 多目标消息只取第一个目标的字段。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationFrame {
  pub seq: u64,
  pub data: Box<[f32]>,
}

/// 解码后的单个检测目标
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  pub class_id: u32,
  pub width: f32,
  pub height: f32,
  pub offset_x: f32,
  pub offset_y: f32,
}

impl ObservationFrame {
  pub fn new(seq: u64, data: Vec<f32>) -> Self {
    Self {
      seq,
      data: data.into_boxed_slice(),
    }
  }

  /// 本周期无检测目标的空观测
  pub fn empty(seq: u64) -> Self {
    Self {
      seq,
      data: Box::new([]),
    }
  }

  /// 解码出本周期的检测目标。
  ///
  /// 空数组、字段不足、类别号为负（上游以 -1 表示无目标）均返回 `None`，
  /// 残缺消息按“无检测”处理，不会中断控制循环。
  pub fn detection(&self) -> Option<Detection> {
    if self.data.is_empty() {
      return None;
    }
    if self.data.len() < FIELD_COUNT {
      warn!(
        "观测 {} 字段不足: 期望至少 {} 个, 实际 {} 个, 按无目标处理",
        self.seq,
        FIELD_COUNT,
        self.data.len()
      );
      return None;
    }

    let raw_id = self.data[FIELD_CLASS_ID];
    if raw_id < 0.0 {
      return None;
    }

    Some(Detection {
      class_id: raw_id as u32,
      width: self.data[FIELD_WIDTH],
      height: self.data[FIELD_HEIGHT],
      offset_x: self.data[FIELD_OFFSET_X],
      offset_y: self.data[FIELD_OFFSET_Y],
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full_payload(class_id: f32) -> Vec<f32> {
    let mut data = vec![0.0f32; FIELD_COUNT];
    data[FIELD_CLASS_ID] = class_id;
    data[FIELD_WIDTH] = 12.0;
    data[FIELD_HEIGHT] = 18.0;
    data[FIELD_OFFSET_X] = 100.0;
    data[FIELD_OFFSET_Y] = 40.0;
    data
  }

  #[test]
  fn full_payload_decodes_fixed_indices() {
    let frame = ObservationFrame::new(1, full_payload(7.0));
    let detection = frame.detection().expect("expected a detection");
    assert_eq!(detection.class_id, 7);
    assert_eq!(detection.width, 12.0);
    assert_eq!(detection.height, 18.0);
    assert_eq!(detection.offset_x, 100.0);
    assert_eq!(detection.offset_y, 40.0);
  }

  #[test]
  fn empty_frame_means_no_detection() {
    assert_eq!(ObservationFrame::empty(3).detection(), None);
  }

  #[test]
  fn short_payload_fails_closed() {
    let frame = ObservationFrame::new(4, vec![7.0, 12.0, 18.0]);
    assert_eq!(frame.detection(), None);
  }

  #[test]
  fn negative_class_id_is_the_no_object_sentinel() {
    let frame = ObservationFrame::new(5, full_payload(-1.0));
    assert_eq!(frame.detection(), None);
  }

  #[test]
  fn fractional_class_id_truncates() {
    let frame = ObservationFrame::new(6, full_payload(7.9));
    assert_eq!(frame.detection().map(|d| d.class_id), Some(7));
  }

  #[test]
  fn extra_trailing_fields_are_ignored() {
    let mut data = full_payload(11.0);
    data.extend_from_slice(&[21.0, 30.0, 30.0]);
    let frame = ObservationFrame::new(7, data);
    assert_eq!(frame.detection().map(|d| d.class_id), Some(11));
  }
}
