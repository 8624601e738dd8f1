//! 捕捉辅助线
//!
//! 辅助线只用于显示，作为 [`NodeRole::Guide`] 节点加入场景，
//! 因此永远不会成为捕捉目标。

use crate::entity::ObjectId;
use crate::geometry::{Geometry, Polyline};
use crate::math::Point3;
use crate::scene::{Color, Material, NodeRole, Scene, SceneObject};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// 辅助线线型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideStyle {
    Solid,
    Dashed,
}

/// 单条辅助线
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub start: Point3,
    pub end: Point3,
    pub color: Color,
    pub opacity: f32,
    pub style: GuideStyle,
}

impl GuideLine {
    /// 从锚点到捕捉点的实线
    pub fn solid(start: Point3, end: Point3, color: Color) -> Self {
        Self {
            start,
            end,
            color,
            opacity: 0.9,
            style: GuideStyle::Solid,
        }
    }

    /// 参考几何上的虚线标记
    pub fn dashed(start: Point3, end: Point3, color: Color) -> Self {
        Self {
            start,
            end,
            color,
            opacity: 0.6,
            style: GuideStyle::Dashed,
        }
    }
}

/// 辅助线图层：管理辅助线节点的创建与销毁
#[derive(Debug)]
pub struct GuideLayer {
    nodes: Vec<ObjectId>,
    lines: Vec<GuideLine>,
    /// 最近一次有捕捉支撑的时间
    last_support: Option<Instant>,
    debounce: Duration,
    disposed: usize,
}

impl GuideLayer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            nodes: Vec::new(),
            lines: Vec::new(),
            last_support: None,
            debounce,
            disposed: 0,
        }
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// 替换当前显示的辅助线
    pub fn show_at(&mut self, scene: &mut Scene, lines: Vec<GuideLine>, now: Instant) {
        self.clear(scene);
        for line in &lines {
            let node = SceneObject::line(
                "Guide",
                Geometry::Polyline(Polyline::line(line.start, line.end)),
            )
            .with_role(NodeRole::Guide)
            .with_material(Material::basic(line.color).with_opacity(line.opacity));
            self.nodes.push(scene.add(node));
        }
        tracing::trace!("Guides shown: {}", lines.len());
        self.lines = lines;
        self.last_support = Some(now);
    }

    /// 当前指针位置不再支撑辅助线；超过防抖时间后销毁
    pub fn release_at(&mut self, scene: &mut Scene, now: Instant) {
        if self.nodes.is_empty() {
            return;
        }
        let expired = self
            .last_support
            .is_none_or(|t| now.saturating_duration_since(t) >= self.debounce);
        if expired {
            self.clear(scene);
        }
    }

    /// 立即销毁所有辅助线节点
    pub fn clear(&mut self, scene: &mut Scene) {
        if self.nodes.is_empty() {
            return;
        }
        for id in self.nodes.drain(..) {
            if scene.remove_subtree(id).is_some() {
                self.disposed += 1;
            }
        }
        self.lines.clear();
        self.last_support = None;
        tracing::trace!("Guides cleared");
    }

    pub fn lines(&self) -> &[GuideLine] {
        &self.lines
    }

    pub fn active_count(&self) -> usize {
        self.nodes.len()
    }

    /// 累计销毁的辅助线节点数
    pub fn disposed_count(&self) -> usize {
        self.disposed
    }
}
