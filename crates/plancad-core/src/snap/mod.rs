//! 对象捕捉系统
//!
//! 把射线求得的原始三维点修正为几何上“正确”的点。按优先级依次尝试：
//!
//! 1. 局部点捕捉（端点、中点、四分点、三分点、圆心）与交点捕捉，
//!    两者同属邻近层级，按屏幕距离取最近者，相等时局部点优先
//! 2. 远距约束捕捉（水平/垂直对齐、平行、垂直、交点投影、远距中点），
//!    命中时显示辅助线
//! 3. 网格角点
//! 4. 回退：吸附网格或原样返回
//!
//! 邻近判断以屏幕像素计，对齐判断以世界单位计。

mod distant;
mod grid;
mod intersection;
mod local;

use crate::camera::Camera;
use crate::entity::ObjectId;
use crate::geometry::{Feature, Segment};
use crate::guide::{GuideLayer, GuideLine};
use crate::math::{Point2, Point3};
use crate::scene::{Color, Scene};
use crate::throttle::Throttle;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// 锚点连线颜色
pub const GUIDE_COLOR: Color = Color::new(0.13, 0.59, 0.95);
/// 参考几何标记颜色
pub const REFERENCE_COLOR: Color = Color::new(1.0, 0.6, 0.0);

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapKind {
    /// 端点
    Endpoint,
    /// 中点（直线段中点或圆弧 50% 弧长点）
    Midpoint,
    /// 四分点
    Quarter,
    /// 三分点
    Third,
    /// 圆心
    Center,
    /// 两条已有线段的交点
    Intersection,
    /// 正在绘制的线段与已有线段的交点
    GhostIntersection,
    /// 网格角点
    GridCorner,
    /// 水平对齐
    DistantAlignH,
    /// 垂直对齐
    DistantAlignV,
    /// 平行
    Parallel,
    /// 垂直
    Perpendicular,
    /// 交点投影
    IntersectionProjection,
    /// 远距中点对齐
    DistantCenter,
}

impl SnapKind {
    pub const ALL: [SnapKind; 14] = [
        SnapKind::Endpoint,
        SnapKind::Midpoint,
        SnapKind::Quarter,
        SnapKind::Third,
        SnapKind::Center,
        SnapKind::Intersection,
        SnapKind::GhostIntersection,
        SnapKind::GridCorner,
        SnapKind::DistantAlignH,
        SnapKind::DistantAlignV,
        SnapKind::Parallel,
        SnapKind::Perpendicular,
        SnapKind::IntersectionProjection,
        SnapKind::DistantCenter,
    ];

    /// 状态栏显示的名称
    pub fn label(&self) -> &'static str {
        match self {
            SnapKind::Endpoint => "Extrémité",
            SnapKind::Midpoint => "Milieu",
            SnapKind::Quarter => "Quart",
            SnapKind::Third => "Tiers",
            SnapKind::Center => "Centre",
            SnapKind::Intersection => "Intersection",
            SnapKind::GhostIntersection => "Intersection (tracé)",
            SnapKind::GridCorner => "Grille",
            SnapKind::DistantAlignH => "Alignement horizontal",
            SnapKind::DistantAlignV => "Alignement vertical",
            SnapKind::Parallel => "Parallèle",
            SnapKind::Perpendicular => "Perpendiculaire",
            SnapKind::IntersectionProjection => "Projection d'intersection",
            SnapKind::DistantCenter => "Centre distant",
        }
    }

    /// 是否属于远距约束捕捉（带辅助线）
    pub fn is_distant(&self) -> bool {
        matches!(
            self,
            SnapKind::DistantAlignH
                | SnapKind::DistantAlignV
                | SnapKind::Parallel
                | SnapKind::Perpendicular
                | SnapKind::IntersectionProjection
                | SnapKind::DistantCenter
        )
    }

    fn bit(&self) -> u16 {
        1 << (*self as u16)
    }
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u16,
}

impl SnapMask {
    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask { bits: 0x3FFF };

    pub fn new(bits: u16) -> Self {
        Self { bits }
    }

    pub fn is_enabled(&self, kind: SnapKind) -> bool {
        self.bits & kind.bit() != 0
    }

    pub fn set(&mut self, kind: SnapKind, enabled: bool) {
        if enabled {
            self.bits |= kind.bit();
        } else {
            self.bits &= !kind.bit();
        }
    }

    pub fn toggle(&mut self, kind: SnapKind) {
        let enabled = self.is_enabled(kind);
        self.set(kind, !enabled);
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// 捕捉配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// 局部/交点捕捉距离（屏幕像素）
    pub snap_distance_px: f64,
    /// 远距捕捉距离（屏幕像素）
    pub distant_snap_distance_px: f64,
    /// 对齐容差（世界单位）
    pub alignment_tolerance: f64,
    /// 平行判定：单位方向叉积上限
    pub parallel_tolerance: f64,
    /// 垂直判定：单位方向点积上限
    pub perpendicular_tolerance: f64,
    pub grid_spacing: f64,
    /// 参考网格是否可见（启用网格角点捕捉）
    pub grid_visible: bool,
    /// 无捕捉时吸附到网格
    pub snap_to_grid: bool,
    /// 辅助线防抖（毫秒）
    pub guide_debounce_ms: u64,
    /// 捕捉计算节流（毫秒）
    pub throttle_ms: u64,
    /// 启用的捕捉类型
    pub enabled: SnapMask,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_distance_px: 10.0,
            distant_snap_distance_px: 10.0,
            alignment_tolerance: 0.5,
            parallel_tolerance: 0.1,
            perpendicular_tolerance: 0.1,
            grid_spacing: 1.0,
            grid_visible: false,
            snap_to_grid: false,
            guide_debounce_ms: 80,
            throttle_ms: 16,
            enabled: SnapMask::default(),
        }
    }
}

/// 当前绘图工具类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Select,
    Line,
    Polyline,
    Arc,
    Rectangle,
    Circle,
    Extrude,
}

impl ToolKind {
    /// 是否为多点绘图工具
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            ToolKind::Line
                | ToolKind::Polyline
                | ToolKind::Arc
                | ToolKind::Rectangle
                | ToolKind::Circle
        )
    }
}

/// 绘图工具提供给捕捉引擎的上下文
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingContext {
    /// 是否处于多点绘图会话中
    pub active: bool,
    pub tool: ToolKind,
    /// 已放置的点，最后一个为当前锚点
    pub points: Vec<Point3>,
}

impl DrawingContext {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn drawing(tool: ToolKind, points: Vec<Point3>) -> Self {
        Self {
            active: true,
            tool,
            points,
        }
    }

    pub fn anchor(&self) -> Option<Point3> {
        if self.active {
            self.points.last().copied()
        } else {
            None
        }
    }

    fn is_drawing(&self) -> bool {
        self.active && self.tool.is_drawing()
    }
}

/// 捕捉候选
#[derive(Debug, Clone, PartialEq)]
pub struct SnapCandidate {
    pub point: Point3,
    pub kind: SnapKind,
    /// 到指针的屏幕距离（像素）
    pub distance_px: f64,
    /// 命中时显示的辅助线
    pub guides: Vec<GuideLine>,
}

impl SnapCandidate {
    pub fn new(point: Point3, kind: SnapKind, distance_px: f64) -> Self {
        Self {
            point,
            kind,
            distance_px,
            guides: Vec::new(),
        }
    }

    pub fn with_guides(mut self, guides: Vec<GuideLine>) -> Self {
        self.guides = guides;
        self
    }
}

/// 捕捉结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub point: Point3,
    /// 未命中任何捕捉时为 None
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    pub fn raw(point: Point3) -> Self {
        Self { point, kind: None }
    }

    pub fn label(&self) -> Option<&'static str> {
        self.kind.map(|k| k.label())
    }
}

/// 一次捕捉查询的输入
pub(crate) struct SnapQuery<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub raw: Point3,
    pub pointer: Point2,
    pub context: &'a DrawingContext,
    pub config: &'a SnapConfig,
}

impl SnapQuery<'_> {
    /// 掩码启用且在像素阈值内时生成候选
    pub fn candidate(&self, point: Point3, kind: SnapKind, threshold_px: f64) -> Option<SnapCandidate> {
        if !self.config.enabled.is_enabled(kind) {
            return None;
        }
        let distance = self.camera.screen_distance(&point, &self.pointer);
        (distance <= threshold_px).then(|| SnapCandidate::new(point, kind, distance))
    }

    /// 所有捕捉目标的直线段（世界坐标）
    pub fn segments(&self) -> Vec<(ObjectId, Segment)> {
        self.scene
            .snap_targets()
            .into_iter()
            .flat_map(|id| {
                self.scene
                    .world_features(id)
                    .into_iter()
                    .filter_map(move |f| match f {
                        Feature::Straight(s) => Some((id, s)),
                        _ => None,
                    })
            })
            .collect()
    }
}

/// 取距离最小的候选；相等时保留先出现者
fn nearest(candidates: impl IntoIterator<Item = SnapCandidate>) -> Option<SnapCandidate> {
    let mut best: Option<SnapCandidate> = None;
    for c in candidates {
        if best.as_ref().is_none_or(|b| c.distance_px < b.distance_px) {
            best = Some(c);
        }
    }
    best
}

/// 捕捉引擎
///
/// 负责计算捕捉点并管理辅助线的生命周期
#[derive(Debug)]
pub struct SnapEngine {
    config: SnapConfig,
    guides: GuideLayer,
    throttle: Throttle,
    /// 节流期间返回的上次结果
    last_result: Option<SnapResult>,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        let guides = GuideLayer::new(Duration::from_millis(config.guide_debounce_ms));
        let throttle = Throttle::from_millis(config.throttle_ms);
        Self {
            config,
            guides,
            throttle,
            last_result: None,
        }
    }

    /// 获取配置
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// 替换配置
    pub fn set_config(&mut self, config: SnapConfig) {
        self.guides
            .set_debounce(Duration::from_millis(config.guide_debounce_ms));
        self.throttle = Throttle::from_millis(config.throttle_ms);
        self.config = config;
    }

    pub fn guides(&self) -> &GuideLayer {
        &self.guides
    }

    /// 计算捕捉点
    pub fn resolve(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        raw: Point3,
        pointer: Point2,
        context: &DrawingContext,
    ) -> SnapResult {
        self.resolve_at(scene, camera, raw, pointer, context, Instant::now())
    }

    /// 节流版本：距上次计算不足节流间隔时返回缓存结果
    pub fn resolve_throttled_at(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        raw: Point3,
        pointer: Point2,
        context: &DrawingContext,
        now: Instant,
    ) -> SnapResult {
        if !self.throttle.ready_at(now) {
            if let Some(cached) = self.last_result {
                return cached;
            }
        }
        self.resolve_at(scene, camera, raw, pointer, context, now)
    }

    /// 按优先级计算捕捉点（`now` 用于辅助线防抖）
    pub fn resolve_at(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        raw: Point3,
        pointer: Point2,
        context: &DrawingContext,
        now: Instant,
    ) -> SnapResult {
        let (result, guides) = {
            let query = SnapQuery {
                scene: &*scene,
                camera,
                raw,
                pointer,
                context,
                config: &self.config,
            };
            Self::cascade(&query)
        };

        match guides {
            Some(lines) => self.guides.show_at(scene, lines, now),
            None => self.guides.release_at(scene, now),
        }

        if let Some(kind) = result.kind {
            tracing::trace!("Snap {:?} at ({:.3}, {:.3})", kind, result.point.x, result.point.y);
        }
        self.last_result = Some(result);
        result
    }

    fn cascade(query: &SnapQuery<'_>) -> (SnapResult, Option<Vec<GuideLine>>) {
        // 邻近层级：局部点在前，距离相等时先出现者胜出
        let mut proximity = Vec::new();
        if query.context.is_drawing() {
            proximity.extend(local::collect(query));
        }
        proximity.extend(intersection::collect(query));
        if let Some(best) = nearest(proximity) {
            return (
                SnapResult {
                    point: best.point,
                    kind: Some(best.kind),
                },
                None,
            );
        }

        if let Some(best) = distant::collect(query) {
            let guides = best.guides.clone();
            return (
                SnapResult {
                    point: best.point,
                    kind: Some(best.kind),
                },
                Some(guides),
            );
        }

        if query.config.grid_visible {
            if let Some(best) = grid::corner(query) {
                return (
                    SnapResult {
                        point: best.point,
                        kind: Some(best.kind),
                    },
                    None,
                );
            }
        }

        (grid::fallback(query.raw, query.config), None)
    }

    /// 结束绘图会话：立即销毁辅助线并清除缓存
    pub fn end_session(&mut self, scene: &mut Scene) {
        self.guides.clear(scene);
        self.last_result = None;
        self.throttle.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Polyline};
    use crate::math::Vector2;
    use crate::scene::{NodeRole, SceneObject};

    /// 10 像素 = 1 世界单位，原点位于屏幕 (400, 300)
    pub(super) fn camera() -> Camera {
        Camera::top_down(Point2::origin(), 10.0, Vector2::new(800.0, 600.0))
    }

    pub(super) fn screen(camera: &Camera, x: f64, y: f64) -> Point2 {
        camera.project(&Point3::new(x, y, 0.0)).unwrap_or_else(Point2::origin)
    }

    pub(super) fn add_line(scene: &mut Scene, a: (f64, f64), b: (f64, f64)) -> ObjectId {
        scene.add(SceneObject::line(
            "Line",
            Geometry::Polyline(Polyline::line(
                Point3::new(a.0, a.1, 0.0),
                Point3::new(b.0, b.1, 0.0),
            )),
        ))
    }

    fn resolve(
        engine: &mut SnapEngine,
        scene: &mut Scene,
        x: f64,
        y: f64,
        ctx: &DrawingContext,
    ) -> SnapResult {
        let cam = camera();
        let pointer = screen(&cam, x, y);
        engine.resolve_at(scene, &cam, Point3::new(x, y, 0.0), pointer, ctx, Instant::now())
    }

    #[test]
    fn test_mask_bits() {
        let mut mask = SnapMask::default();
        assert!(SnapKind::ALL.iter().all(|k| mask.is_enabled(*k)));
        mask.toggle(SnapKind::Third);
        assert!(!mask.is_enabled(SnapKind::Third));
        assert!(mask.is_enabled(SnapKind::Quarter));
        assert!(!SnapMask::NONE.is_enabled(SnapKind::Endpoint));
    }

    #[test]
    fn test_local_snaps_only_while_drawing() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 0.0));
        let mut engine = SnapEngine::new(SnapConfig::default());

        let idle = resolve(&mut engine, &mut scene, 5.05, 0.05, &DrawingContext::idle());
        assert_eq!(idle.kind, None);

        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);
        let snapped = resolve(&mut engine, &mut scene, 5.05, 0.05, &ctx);
        assert_eq!(snapped.kind, Some(SnapKind::Midpoint));
        assert!((snapped.point.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_endpoint_beats_farther_intersection() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 0.0));
        add_line(&mut scene, (0.5, -5.0), (0.5, 3.0));
        let mut engine = SnapEngine::new(SnapConfig::default());
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);

        // 端点 (0,0) 距 1 像素，交点 (0.5,0) 距 4 像素
        let result = resolve(&mut engine, &mut scene, 0.1, 0.0, &ctx);
        assert_eq!(result.kind, Some(SnapKind::Endpoint));

        let result = resolve(&mut engine, &mut scene, 0.45, 0.0, &ctx);
        assert_eq!(result.kind, Some(SnapKind::Intersection));
    }

    fn add_box(scene: &mut Scene) -> ObjectId {
        let mesh = crate::extrude::extrude_profile(
            &crate::geometry::Profile::rectangle(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)),
            1.0,
        )
        .unwrap();
        scene.add(SceneObject::mesh("Box", Geometry::Mesh(mesh)))
    }

    #[test]
    fn test_mesh_edge_midpoint() {
        let mut scene = Scene::new();
        add_box(&mut scene);
        let mut engine = SnapEngine::new(SnapConfig::default());
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);

        let result = resolve(&mut engine, &mut scene, 1.05, 0.05, &ctx);
        assert_eq!(result.kind, Some(SnapKind::Midpoint));
        assert!((result.point.x - 1.0).abs() < 1e-9);
        assert!(result.point.y.abs() < 1e-9);
    }

    #[test]
    fn test_line_crossing_mesh_edge() {
        let mut scene = Scene::new();
        add_box(&mut scene);
        add_line(&mut scene, (0.3, -3.0), (0.3, 1.0));
        let mut engine = SnapEngine::new(SnapConfig::default());
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);

        let result = resolve(&mut engine, &mut scene, 0.32, 0.03, &ctx);
        assert_eq!(result.kind, Some(SnapKind::Intersection));
        assert!((result.point.x - 0.3).abs() < 1e-9);
        assert!(result.point.y.abs() < 1e-9);
    }

    #[test]
    fn test_guides_never_snap_targets() {
        let mut scene = Scene::new();
        scene.add(
            SceneObject::line(
                "Guide",
                Geometry::Polyline(Polyline::line(
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(10.0, 0.0, 0.0),
                )),
            )
            .with_role(NodeRole::Guide),
        );
        let mut engine = SnapEngine::new(SnapConfig::default());
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);

        let result = resolve(&mut engine, &mut scene, 0.05, 0.0, &ctx);
        assert_eq!(result.kind, None);
    }

    #[test]
    fn test_fallback_snap_to_grid() {
        let mut scene = Scene::new();
        let mut engine = SnapEngine::new(SnapConfig {
            snap_to_grid: true,
            grid_spacing: 2.0,
            ..SnapConfig::default()
        });

        let result = resolve(&mut engine, &mut scene, 3.3, -2.9, &DrawingContext::idle());
        assert_eq!(result.kind, None);
        assert!((result.point.x - 4.0).abs() < 1e-9);
        assert!((result.point.y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_throttled_returns_cached() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 0.0));
        let mut engine = SnapEngine::new(SnapConfig::default());
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);
        let cam = camera();
        let t0 = Instant::now();

        let first = engine.resolve_throttled_at(
            &mut scene,
            &cam,
            Point3::new(0.05, 0.0, 0.0),
            screen(&cam, 0.05, 0.0),
            &ctx,
            t0,
        );
        assert_eq!(first.kind, Some(SnapKind::Endpoint));

        let cached = engine.resolve_throttled_at(
            &mut scene,
            &cam,
            Point3::new(50.0, 20.0, 0.0),
            screen(&cam, 50.0, 20.0),
            &ctx,
            t0 + Duration::from_millis(5),
        );
        assert_eq!(cached, first);

        let fresh = engine.resolve_throttled_at(
            &mut scene,
            &cam,
            Point3::new(50.0, 20.0, 0.0),
            screen(&cam, 50.0, 20.0),
            &ctx,
            t0 + Duration::from_millis(20),
        );
        assert_eq!(fresh.kind, None);
    }

    #[test]
    fn test_end_session_disposes_guides() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 5.0), (10.0, 5.0));
        let mut engine = SnapEngine::new(SnapConfig::default());
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![Point3::new(-20.0, -20.0, 0.0)]);

        // 与端点 (10,5) 水平对齐
        let result = resolve(&mut engine, &mut scene, 30.0, 5.2, &ctx);
        assert_eq!(result.kind, Some(SnapKind::DistantAlignH));
        assert!(engine.guides().active_count() > 0);

        engine.end_session(&mut scene);
        assert_eq!(engine.guides().active_count(), 0);
        assert_eq!(scene.count_role(NodeRole::Guide), 0);
    }
}
