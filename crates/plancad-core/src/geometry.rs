//! 几何图元定义
//!
//! 支持的图元：
//! - 多段线 (Polyline)，闭合或开放
//! - 圆弧 (Arc)，圆视为扫掠 2π 的圆弧
//! - 轮廓 (Profile)：矩形、圆、任意多边形的平面封闭区域，可拉伸
//! - 网格 (Mesh)：三角面片，带法线与 UV
//! - 线段集 (Segments)：互不相连的线段，用于轮廓叠加层

use crate::error::GeometryError;
use crate::math::{
    circle_through_three_points, lerp3, xy, BoundingBox3, Point2, Point3, Vector2, Vector3,
    EPSILON,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

/// 圆形轮廓离散化的段数
pub const CIRCLE_SEGMENTS: usize = 64;

/// 网格捕捉使用的特征边折角（度）
pub const MESH_CREASE_ANGLE_DEG: f64 = 30.0;

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Polyline(Polyline),
    Arc(Arc),
    Profile(Profile),
    Mesh(MeshData),
    Segments(Vec<Segment>),
}

impl Geometry {
    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Polyline(_) => "Polyline",
            Geometry::Arc(_) => "Arc",
            Geometry::Profile(p) => p.kind().name(),
            Geometry::Mesh(_) => "Mesh",
            Geometry::Segments(_) => "Segments",
        }
    }

    /// 局部坐标下的包围盒
    pub fn bounding_box(&self) -> BoundingBox3 {
        match self {
            Geometry::Polyline(pl) => BoundingBox3::from_points(pl.points.iter()),
            Geometry::Arc(a) => {
                let pts: Vec<Point3> = (0..=16).map(|i| a.point_at_fraction(i as f64 / 16.0)).collect();
                BoundingBox3::from_points(pts.iter())
            }
            Geometry::Profile(p) => {
                let pts: Vec<Point3> = p
                    .outline()
                    .into_iter()
                    .map(|q| Point3::new(q.x, q.y, 0.0))
                    .collect();
                BoundingBox3::from_points(pts.iter())
            }
            Geometry::Mesh(m) => m.bounding_box(),
            Geometry::Segments(segments) => {
                BoundingBox3::from_points(segments.iter().flat_map(|s| [&s.start, &s.end]))
            }
        }
    }

    /// 可捕捉的几何特征（局部坐标）
    pub fn features(&self) -> Vec<Feature> {
        match self {
            Geometry::Polyline(pl) => pl.segments().into_iter().map(Feature::Straight).collect(),
            Geometry::Arc(a) => vec![Feature::Curved(a.clone())],
            Geometry::Profile(Profile::Circle { center, radius }) => {
                vec![Feature::Curved(Arc::circle(Point3::new(center.x, center.y, 0.0), *radius))]
            }
            Geometry::Profile(p) => closed_segments(
                p.outline().into_iter().map(|q| Point3::new(q.x, q.y, 0.0)),
            )
            .into_iter()
            .map(Feature::Straight)
            .collect(),
            Geometry::Mesh(m) => m
                .feature_edges(MESH_CREASE_ANGLE_DEG)
                .into_iter()
                .map(Feature::Straight)
                .collect(),
            Geometry::Segments(segments) => segments.iter().copied().map(Feature::Straight).collect(),
        }
    }

    /// 所有顶点（局部坐标）
    pub fn vertices(&self) -> Vec<Point3> {
        match self {
            Geometry::Polyline(pl) => pl.points.clone(),
            Geometry::Arc(a) => vec![a.start_point(), a.end_point()],
            Geometry::Profile(p) => p
                .outline()
                .into_iter()
                .map(|q| Point3::new(q.x, q.y, 0.0))
                .collect(),
            Geometry::Mesh(m) => m.positions.clone(),
            Geometry::Segments(segments) => segments.iter().flat_map(|s| [s.start, s.end]).collect(),
        }
    }
}

/// 捕捉引擎使用的几何特征
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// 直线段：端点、中点、四分点、三分点
    Straight(Segment),
    /// 圆弧：端点、圆心、弧长 25/50/75% 点
    Curved(Arc),
}

/// 三维线段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point3,
    pub end: Point3,
}

impl Segment {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point3 {
        self.point_at(0.5)
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        lerp3(&self.start, &self.end, t)
    }

    /// 平面方向（单位向量）；退化线段返回 None
    pub fn direction_2d(&self) -> Option<Vector2> {
        let d = xy(&self.end) - xy(&self.start);
        let len = d.norm();
        if len < EPSILON {
            None
        } else {
            Some(d / len)
        }
    }

    pub fn start_2d(&self) -> Point2 {
        xy(&self.start)
    }

    pub fn end_2d(&self) -> Point2 {
        xy(&self.end)
    }

    /// 两条线段是否共享端点
    pub fn shares_endpoint(&self, other: &Segment) -> bool {
        let close = |a: &Point3, b: &Point3| (*a - *b).norm() < 1e-6;
        close(&self.start, &other.start)
            || close(&self.start, &other.end)
            || close(&self.end, &other.start)
            || close(&self.end, &other.end)
    }
}

fn closed_segments(points: impl Iterator<Item = Point3>) -> Vec<Segment> {
    let pts: Vec<Point3> = points.collect();
    if pts.len() < 2 {
        return vec![];
    }
    (0..pts.len())
        .map(|i| Segment::new(pts[i], pts[(i + 1) % pts.len()]))
        .collect()
}

/// 多段线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point3>,
    /// 是否闭合
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point3>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// 单条线段
    pub fn line(start: Point3, end: Point3) -> Self {
        Self::new(vec![start, end], false)
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        if self.points.len() < 2 {
            return 0;
        }
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    pub fn segments(&self) -> Vec<Segment> {
        (0..self.segment_count())
            .map(|i| Segment::new(self.points[i], self.points[(i + 1) % self.points.len()]))
            .collect()
    }

    /// 所有点是否位于同一水平面
    pub fn is_planar(&self) -> bool {
        match self.points.first() {
            Some(first) => self.points.iter().all(|p| (p.z - first.z).abs() < 1e-6),
            None => false,
        }
    }
}

/// 圆弧（XY 平面内，逆时针从 start_angle 扫到 end_angle）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point3,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point3, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 整圆
    pub fn circle(center: Point3, radius: f64) -> Self {
        Self::new(center, radius, 0.0, TAU)
    }

    /// 从三点创建圆弧（起点、弧上一点、终点）
    pub fn from_three_points(p1: Point3, p2: Point3, p3: Point3) -> Option<Self> {
        let (c, radius) = circle_through_three_points(xy(&p1), xy(&p2), xy(&p3))?;
        let center = Point3::new(c.x, c.y, p1.z);

        let angle_of = |p: &Point3| (p.y - c.y).atan2(p.x - c.x);
        let a1 = angle_of(&p1);
        let a2 = angle_of(&p2);
        let a3 = angle_of(&p3);

        // 中间点在 a1 -> a3 的逆时针扫掠内则保持方向，否则反向
        let ccw = normalize_angle(a2 - a1) < normalize_angle(a3 - a1);
        if ccw {
            Some(Self::new(center, radius, a1, a3))
        } else {
            Some(Self::new(center, radius, a3, a1))
        }
    }

    /// 计算扫过的角度
    pub fn sweep_angle(&self) -> f64 {
        let mut sweep = self.end_angle - self.start_angle;
        while sweep < 0.0 {
            sweep += TAU;
        }
        while sweep > TAU {
            sweep -= TAU;
        }
        sweep
    }

    pub fn is_full_circle(&self) -> bool {
        (self.sweep_angle() - TAU).abs() < 1e-9
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.sweep_angle() * self.radius
    }

    pub fn point_at_angle(&self, angle: f64) -> Point3 {
        Point3::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            self.center.z,
        )
    }

    /// 按弧长比例取点（0 = 起点，1 = 终点）
    pub fn point_at_fraction(&self, t: f64) -> Point3 {
        self.point_at_angle(self.start_angle + self.sweep_angle() * t)
    }

    pub fn start_point(&self) -> Point3 {
        self.point_at_angle(self.start_angle)
    }

    pub fn end_point(&self) -> Point3 {
        self.point_at_angle(self.end_angle)
    }
}

/// 归一化到 [0, 2π)
fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// 轮廓类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileKind {
    Rectangle,
    Circle,
    Shape,
}

impl ProfileKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileKind::Rectangle => "Rectangle",
            ProfileKind::Circle => "Circle",
            ProfileKind::Shape => "Shape",
        }
    }
}

/// 平面封闭轮廓（局部 XY 平面，z = 0）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Profile {
    Rectangle { min: Point2, max: Point2 },
    Circle { center: Point2, radius: f64 },
    Shape { outline: Vec<Point2> },
}

impl Profile {
    /// 由任意两个对角点创建矩形
    pub fn rectangle(a: Point2, b: Point2) -> Self {
        Profile::Rectangle {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn circle(center: Point2, radius: f64) -> Self {
        Profile::Circle { center, radius }
    }

    pub fn shape(outline: Vec<Point2>) -> Self {
        Profile::Shape { outline }
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            Profile::Rectangle { .. } => ProfileKind::Rectangle,
            Profile::Circle { .. } => ProfileKind::Circle,
            Profile::Shape { .. } => ProfileKind::Shape,
        }
    }

    /// 轮廓多边形（不重复首点）
    pub fn outline(&self) -> Vec<Point2> {
        match self {
            Profile::Rectangle { min, max } => vec![
                Point2::new(min.x, min.y),
                Point2::new(max.x, min.y),
                Point2::new(max.x, max.y),
                Point2::new(min.x, max.y),
            ],
            Profile::Circle { center, radius } => (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let a = 2.0 * PI * i as f64 / CIRCLE_SEGMENTS as f64;
                    Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
                })
                .collect(),
            Profile::Shape { outline } => outline.clone(),
        }
    }

    /// 有向面积（逆时针为正）
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.outline())
    }

    /// 检查轮廓能否用于拉伸
    pub fn validate(&self) -> Result<(), GeometryError> {
        let outline = self.outline();
        if outline.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFinite("profile outline"));
        }
        if outline.len() < 3 {
            return Err(GeometryError::DegenerateProfile(format!(
                "{} points, at least 3 required",
                outline.len()
            )));
        }
        if signed_area(&outline).abs() < EPSILON {
            return Err(GeometryError::DegenerateProfile("zero area".to_string()));
        }
        Ok(())
    }
}

/// 多边形有向面积（鞋带公式）
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

/// 三角网格
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Point3>,
    /// 顶点法线；缺失时 UV 生成退化为常量
    pub normals: Option<Vec<Vector3>>,
    pub uvs: Vec<[f64; 2]>,
    pub indices: Vec<[u32; 3]>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.positions.iter())
    }

    /// 三角形三个顶点
    pub fn triangle(&self, index: usize) -> Option<[Point3; 3]> {
        let [a, b, c] = *self.indices.get(index)?;
        Some([
            *self.positions.get(a as usize)?,
            *self.positions.get(b as usize)?,
            *self.positions.get(c as usize)?,
        ])
    }

    /// 特征边：边界边，以及相邻面法线夹角超过折角的边
    ///
    /// 按位置而非索引判断相邻，拉伸实体的各个面不共享顶点。
    pub fn feature_edges(&self, crease_angle_deg: f64) -> Vec<Segment> {
        let cos_crease = crease_angle_deg.to_radians().cos();
        let mut edges: BTreeMap<(PositionKey, PositionKey), (Segment, Vec<Vector3>)> =
            BTreeMap::new();

        for i in 0..self.triangle_count() {
            let Some([a, b, c]) = self.triangle(i) else {
                continue;
            };
            let Some(normal) = (b - a).cross(&(c - a)).try_normalize(1e-12) else {
                continue;
            };
            for (p, q) in [(a, b), (b, c), (c, a)] {
                let (kp, kq) = (position_key(&p), position_key(&q));
                let key = if kp <= kq { (kp, kq) } else { (kq, kp) };
                edges
                    .entry(key)
                    .or_insert_with(|| (Segment::new(p, q), Vec::new()))
                    .1
                    .push(normal);
            }
        }

        edges
            .into_values()
            .filter(|(_, normals)| match normals.as_slice() {
                [n1, n2] => n1.dot(n2) < cos_crease,
                _ => true,
            })
            .map(|(segment, _)| segment)
            .collect()
    }
}

type PositionKey = (i64, i64, i64);

fn position_key(p: &Point3) -> PositionKey {
    let q = |v: f64| (v * 1e6).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}
