//! PlanCAD 交互核心
//!
//! 把连续的指针输入转换为精确的几何操作，并保持绘图状态一致。
//!
//! # 架构设计
//!
//! - `Scene`: 显式持有的场景注册表（节点、可拾取集合、图层、CAD 属性侧表）
//! - `SnapEngine`: 按优先级修正指针点，并管理辅助线
//! - `extrude`: 平面轮廓拉伸为带 UV 的实体网格
//! - `HistoryLog`: 有界线性撤销/重做日志
//!
//! # 示例
//!
//! ```rust
//! use plancad_core::prelude::*;
//!
//! let profile = Profile::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
//! let mesh = extrude_profile(&profile, 2.0).unwrap();
//! assert!((mesh.bounding_box().size().z - 2.0).abs() < 1e-9);
//! ```

pub mod attributes;
pub mod camera;
pub mod entity;
pub mod error;
pub mod extrude;
pub mod geometry;
pub mod guide;
pub mod history;
pub mod math;
pub mod scene;
pub mod snap;
pub mod throttle;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::attributes::{
        AttributeTable, CadAttributes, ElementClass, ExtrusionInfo, HighlightKind, HighlightRecord,
    };
    pub use crate::camera::Camera;
    pub use crate::entity::{LayerId, ObjectId};
    pub use crate::error::GeometryError;
    pub use crate::extrude::{can_extrude, extract_profile, extrude_profile, generate_uvs, UvMode};
    pub use crate::geometry::{Arc, Feature, Geometry, MeshData, Polyline, Profile, ProfileKind, Segment};
    pub use crate::guide::{GuideLayer, GuideLine, GuideStyle};
    pub use crate::history::{HistoryAction, HistoryEntry, HistoryLog, HistoryPayload};
    pub use crate::math::{BoundingBox2, BoundingBox3, Point2, Point3, Vector2, Vector3};
    pub use crate::scene::{
        Color, Material, MaterialKind, NodeRole, ObjectKind, ObjectSnapshot, Scene, SceneObject,
        Transform,
    };
    pub use crate::snap::{
        DrawingContext, SnapCandidate, SnapConfig, SnapEngine, SnapKind, SnapMask, SnapResult,
        ToolKind,
    };
    pub use crate::throttle::Throttle;
}
