//! 选择高亮策略
//!
//! 高亮必须可以精确还原。网格对象按顺序尝试一组策略，第一个成功的生效：
//! 边缘轮廓 -> 自发光 -> 线框 -> 放大的半透明副本。
//! 线条对象直接改线条颜色，并记住原始颜色。

use crate::config::HighlightConfig;
use crate::error::HighlightError;
use plancad_core::attributes::{HighlightKind, HighlightRecord};
use plancad_core::entity::ObjectId;
use plancad_core::geometry::{Geometry, Profile, Segment};
use plancad_core::math::{Point3, Vector3};
use plancad_core::scene::{Color, Material, NodeRole, Scene, SceneObject, Transform};

/// 高亮策略
pub trait HighlightStrategy {
    fn kind(&self) -> HighlightKind;

    /// 应用高亮，返回还原所需的记录
    fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Result<HighlightRecord, HighlightError>;
}

/// 按顺序尝试的策略链
pub struct HighlightChain {
    strategies: Vec<Box<dyn HighlightStrategy>>,
}

impl Default for HighlightChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(EdgeOutline),
            Box::new(EmissiveTint),
            Box::new(WireframeOverlay),
            Box::new(InflatedShell),
        ])
    }
}

impl HighlightChain {
    pub fn new(strategies: Vec<Box<dyn HighlightStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn kinds(&self) -> Vec<HighlightKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// 依次尝试，返回第一个成功的记录；全部失败时返回 None
    pub fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Option<HighlightRecord> {
        for strategy in &self.strategies {
            match strategy.apply(scene, target, config) {
                Ok(record) => return Some(record),
                Err(err) => {
                    tracing::warn!("Highlight {:?} failed, falling back: {}", strategy.kind(), err);
                }
            }
        }
        tracing::debug!("No highlight strategy succeeded for {}", target);
        None
    }
}

/// 撤销高亮
pub fn remove_highlight(scene: &mut Scene, target: ObjectId, record: &HighlightRecord) {
    if let Some(overlay) = record.overlay {
        scene.remove_subtree(overlay);
    }
    let Some(obj) = scene.get_mut(target) else {
        return;
    };
    match record.kind {
        HighlightKind::LineColor => {
            if let Some(color) = record.original_color {
                obj.material.color = color;
            }
        }
        HighlightKind::EmissiveTint => {
            if let Some(material) = record.original_material {
                obj.material = material;
            }
        }
        HighlightKind::EdgeOutline | HighlightKind::Wireframe | HighlightKind::InflatedShell => {}
    }
}

fn add_overlay(
    scene: &mut Scene,
    target: ObjectId,
    kind: HighlightKind,
    overlay: SceneObject,
) -> Result<HighlightRecord, HighlightError> {
    let id = scene
        .add_child(target, overlay.with_role(NodeRole::Overlay))
        .ok_or(HighlightError::ObjectNotFound(target))?;
    Ok(HighlightRecord::overlay(kind, id))
}

/// 线条颜色（仅用于线条对象）
pub struct LineColor;

impl HighlightStrategy for LineColor {
    fn kind(&self) -> HighlightKind {
        HighlightKind::LineColor
    }

    fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Result<HighlightRecord, HighlightError> {
        let obj = scene
            .get_mut(target)
            .ok_or(HighlightError::ObjectNotFound(target))?;
        let original = obj.material.color;
        obj.material.color = config.color;
        Ok(HighlightRecord {
            kind: HighlightKind::LineColor,
            overlay: None,
            original_material: None,
            original_color: Some(original),
        })
    }
}

/// 边缘轮廓叠加层
pub struct EdgeOutline;

impl HighlightStrategy for EdgeOutline {
    fn kind(&self) -> HighlightKind {
        HighlightKind::EdgeOutline
    }

    fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Result<HighlightRecord, HighlightError> {
        let obj = scene
            .get(target)
            .ok_or(HighlightError::ObjectNotFound(target))?;
        let edges = match &obj.geometry {
            Some(Geometry::Mesh(mesh)) => mesh.feature_edges(config.crease_angle_deg),
            Some(Geometry::Profile(profile)) => profile_edges(profile),
            Some(Geometry::Segments(segments)) => segments.clone(),
            Some(Geometry::Polyline(pl)) => pl.segments(),
            Some(Geometry::Arc(_)) | None => return Err(HighlightError::MissingGeometry(target)),
        };
        if edges.is_empty() {
            return Err(HighlightError::NoEdges(target));
        }

        let overlay = SceneObject::line("Contour", Geometry::Segments(edges))
            .with_material(Material::basic(config.color));
        add_overlay(scene, target, HighlightKind::EdgeOutline, overlay)
    }
}

/// 自发光材质
pub struct EmissiveTint;

impl HighlightStrategy for EmissiveTint {
    fn kind(&self) -> HighlightKind {
        HighlightKind::EmissiveTint
    }

    fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Result<HighlightRecord, HighlightError> {
        let obj = scene
            .get_mut(target)
            .ok_or(HighlightError::ObjectNotFound(target))?;
        if obj.material.kind != plancad_core::scene::MaterialKind::Standard {
            return Err(HighlightError::UnsupportedMaterial(target));
        }
        let original = obj.material;
        let k = config.emissive_intensity;
        obj.material.emissive = Color::new(config.color.r * k, config.color.g * k, config.color.b * k);
        Ok(HighlightRecord {
            kind: HighlightKind::EmissiveTint,
            overlay: None,
            original_material: Some(original),
            original_color: None,
        })
    }
}

/// 线框叠加层
pub struct WireframeOverlay;

impl HighlightStrategy for WireframeOverlay {
    fn kind(&self) -> HighlightKind {
        HighlightKind::Wireframe
    }

    fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Result<HighlightRecord, HighlightError> {
        let obj = scene
            .get(target)
            .ok_or(HighlightError::ObjectNotFound(target))?;
        let Some(Geometry::Mesh(mesh)) = &obj.geometry else {
            return Err(HighlightError::MissingGeometry(target));
        };
        if mesh.indices.is_empty() {
            return Err(HighlightError::MissingGeometry(target));
        }

        let mut material = Material::basic(config.color);
        material.wireframe = true;
        let overlay = SceneObject::mesh("Wireframe", Geometry::Mesh(mesh.clone())).with_material(material);
        add_overlay(scene, target, HighlightKind::Wireframe, overlay)
    }
}

/// 略微放大的半透明副本
pub struct InflatedShell;

impl HighlightStrategy for InflatedShell {
    fn kind(&self) -> HighlightKind {
        HighlightKind::InflatedShell
    }

    fn apply(
        &self,
        scene: &mut Scene,
        target: ObjectId,
        config: &HighlightConfig,
    ) -> Result<HighlightRecord, HighlightError> {
        let obj = scene
            .get(target)
            .ok_or(HighlightError::ObjectNotFound(target))?;
        let geometry = obj
            .geometry
            .clone()
            .ok_or(HighlightError::MissingGeometry(target))?;
        let bbox = geometry.bounding_box();
        if bbox.is_empty() {
            return Err(HighlightError::MissingGeometry(target));
        }

        // 以包围盒中心为不动点缩放
        let s = config.inflate_factor;
        let c = bbox.center().coords;
        let transform = Transform {
            translation: c - c * s,
            scale: Vector3::new(s, s, s),
            ..Transform::identity()
        };
        let overlay = SceneObject::mesh("Shell", geometry)
            .with_transform(transform)
            .with_material(Material::basic(config.color).with_opacity(config.overlay_opacity));
        add_overlay(scene, target, HighlightKind::InflatedShell, overlay)
    }
}

fn profile_edges(profile: &Profile) -> Vec<Segment> {
    let outline = profile.outline();
    let n = outline.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let a = outline[i];
            let b = outline[(i + 1) % n];
            Segment::new(Point3::new(a.x, a.y, 0.0), Point3::new(b.x, b.y, 0.0))
        })
        .collect()
}
