// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/marking.rs - 标记状态与定位接口
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

use std::collections::HashMap;

use crate::catalog::HazmatClass;
use crate::observation::Detection;

/// 标志在世界坐标系中的平面位姿
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPose {
  pub x: f32,
  pub y: f32,
  pub theta: f32,
}

/// 一条已标记标志的记录
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedObject {
  pub class: HazmatClass,
  pub pose: MarkerPose,
}

/// 已标记标志集合，运行期间只增不减，仅由控制循环写入。
#[derive(Debug, Default)]
pub struct MarkedObjects {
  records: HashMap<u32, MarkedObject>,
}

impl MarkedObjects {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, class_id: u32) -> bool {
    self.records.contains_key(&class_id)
  }

  pub fn get(&self, class_id: u32) -> Option<&MarkedObject> {
    self.records.get(&class_id)
  }

  pub fn insert(&mut self, class_id: u32, record: MarkedObject) {
    self.records.insert(class_id, record);
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

/// 对准状态，每个控制周期覆盖写入
#[derive(Debug, Default)]
pub struct AlignmentTracker {
  aligned: bool,
}

impl AlignmentTracker {
  pub fn record(&mut self, converged: bool) {
    self.aligned = converged;
  }

  pub fn is_aligned(&self) -> bool {
    self.aligned
  }
}

/// 对准完成后的定位交接点。
///
/// `Ok(None)` 表示本周期条件尚未就绪（变换或测距不可用），下个周期重试；
/// 定位器不得在查询上阻塞控制循环。
pub trait Localize {
  type Error;
  fn locate(&mut self, detection: &Detection) -> Result<Option<MarkerPose>, Self::Error>;
}

/// 占位定位器：永远返回“尚未就绪”，因此不会有标志被写入 MarkedObjects。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLocalizer;

impl Localize for NoopLocalizer {
  type Error = std::convert::Infallible;

  fn locate(&mut self, _detection: &Detection) -> Result<Option<MarkerPose>, Self::Error> {
    // TODO: 接入 RangeSensor 测距与 TransformLookup 的 odom 变换，
    // 融合出 MarkerPose 后由控制循环写入 MarkedObjects
    Ok(None)
  }
}

/// 坐标系间的平面变换
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
  pub x: f32,
  pub y: f32,
  pub theta: f32,
}

/// 变换查询服务（外部协作方，本库只消费）。
/// `Ok(None)` 表示对应时刻的变换还不可用。
pub trait TransformLookup {
  type Error;
  fn lookup(
    &self,
    source_frame: &str,
    target_frame: &str,
    stamp_ms: u64,
  ) -> Result<Option<Transform2d>, Self::Error>;
}

/// 距离传感器读数流（外部协作方，本库只消费）。
/// `Ok(None)` 表示当前没有新的读数。
pub trait RangeSensor {
  type Error;
  fn range(&mut self) -> Result<Option<f32>, Self::Error>;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detection(class_id: u32) -> Detection {
    Detection {
      class_id,
      width: 10.0,
      height: 10.0,
      offset_x: 0.0,
      offset_y: 0.0,
    }
  }

  #[test]
  fn marked_objects_grow_monotonically() {
    let mut marked = MarkedObjects::new();
    assert!(marked.is_empty());
    assert!(!marked.contains(7));

    marked.insert(
      7,
      MarkedObject {
        class: HazmatClass::Radioactive,
        pose: MarkerPose {
          x: 1.0,
          y: 2.0,
          theta: 0.0,
        },
      },
    );
    assert!(marked.contains(7));
    assert_eq!(marked.len(), 1);
    assert_eq!(
      marked.get(7).map(|r| r.class),
      Some(HazmatClass::Radioactive)
    );
  }

  #[test]
  fn alignment_tracker_is_overwritten_each_cycle() {
    let mut tracker = AlignmentTracker::default();
    assert!(!tracker.is_aligned());
    tracker.record(true);
    assert!(tracker.is_aligned());
    tracker.record(false);
    assert!(!tracker.is_aligned());
  }

  #[test]
  fn noop_localizer_never_produces_a_pose() {
    let mut localizer = NoopLocalizer;
    let located = localizer.locate(&detection(7));
    assert_eq!(located, Ok(None));
  }

  struct ScriptedTransforms {
    available_after: u64,
  }

  impl TransformLookup for ScriptedTransforms {
    type Error = std::convert::Infallible;

    fn lookup(
      &self,
      _source_frame: &str,
      _target_frame: &str,
      stamp_ms: u64,
    ) -> Result<Option<Transform2d>, Self::Error> {
      if stamp_ms < self.available_after {
        return Ok(None);
      }
      Ok(Some(Transform2d {
        x: 0.5,
        y: -0.5,
        theta: 0.0,
      }))
    }
  }

  #[test]
  fn transform_lookup_reports_not_yet_available_without_failing() {
    let transforms = ScriptedTransforms {
      available_after: 100,
    };
    assert_eq!(transforms.lookup("camera", "odom", 50), Ok(None));
    let later = transforms.lookup("camera", "odom", 150);
    assert!(matches!(later, Ok(Some(_))));
  }
}
