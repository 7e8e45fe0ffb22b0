// 该文件是 Xunbiao （寻标） 项目的一部分。
// src/admission.rs - 观测准入判定
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

use crate::catalog::HazmatClass;
use crate::marking::MarkedObjects;
use crate::observation::Detection;

/// 判定当前观测是否触发一次新的对准尝试。
///
/// 准入条件：本周期确有检测目标，类别在标志表内，且尚未被标记。
/// “无目标”只能来自当前观测自身的解码结果，这里不接收裸类别号，
/// 以免拿残留状态去做哨兵判断。
pub fn admit(detection: Option<&Detection>, marked: &MarkedObjects) -> Option<HazmatClass> {
  let detection = detection?;
  if marked.contains(detection.class_id) {
    return None;
  }
  HazmatClass::from_class_id(detection.class_id)
}

/// `admit` 的谓词形式
pub fn available_to_mark(detection: Option<&Detection>, marked: &MarkedObjects) -> bool {
  admit(detection, marked).is_some()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::marking::{MarkedObject, MarkerPose};

  fn detection(class_id: u32) -> Detection {
    Detection {
      class_id,
      width: 10.0,
      height: 10.0,
      offset_x: 0.0,
      offset_y: 0.0,
    }
  }

  fn marked_with(class: HazmatClass) -> MarkedObjects {
    let mut marked = MarkedObjects::new();
    marked.insert(
      class.class_id(),
      MarkedObject {
        class,
        pose: MarkerPose {
          x: 0.0,
          y: 0.0,
          theta: 0.0,
        },
      },
    );
    marked
  }

  #[test]
  fn no_detection_is_never_admitted() {
    let empty = MarkedObjects::new();
    assert!(!available_to_mark(None, &empty));
    assert!(!available_to_mark(None, &marked_with(HazmatClass::Poison)));
  }

  #[test]
  fn unknown_classes_are_never_admitted() {
    let empty = MarkedObjects::new();
    for class_id in [0, 1, 2, 8, 63, 999] {
      assert!(
        !available_to_mark(Some(&detection(class_id)), &empty),
        "class {} should not be admitted",
        class_id
      );
    }
  }

  #[test]
  fn catalog_classes_are_admitted_until_marked() {
    let empty = MarkedObjects::new();
    assert_eq!(
      admit(Some(&detection(7)), &empty),
      Some(HazmatClass::Radioactive)
    );
    assert_eq!(
      admit(Some(&detection(51)), &empty),
      Some(HazmatClass::Oxidizer)
    );
  }

  #[test]
  fn marked_classes_stay_excluded() {
    let marked = marked_with(HazmatClass::Radioactive);
    assert!(!available_to_mark(Some(&detection(7)), &marked));
    // 其他未标记的类别不受影响
    assert!(available_to_mark(Some(&detection(11)), &marked));
  }
}
