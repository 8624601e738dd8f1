//! 数学基础类型与二维/三维几何工具
//!
//! 所有坐标使用 f64。绘图平面为世界坐标 XY 平面，Z 为高度方向。

use serde::{Deserialize, Serialize};

pub type Point2 = nalgebra::Point2<f64>;
pub type Point3 = nalgebra::Point3<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// 几何比较的默认容差
pub const EPSILON: f64 = 1e-9;

/// 取三维点在绘图平面上的投影
#[inline]
pub fn xy(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}

/// 二维叉积（z 分量）
#[inline]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 三维点线性插值
#[inline]
pub fn lerp3(a: &Point3, b: &Point3, t: f64) -> Point3 {
    *a + (*b - *a) * t
}

/// 线段-线段交点（仅在两条线段上都有效时返回）
pub fn segment_intersection_2d(a0: Point2, a1: Point2, b0: Point2, b1: Point2) -> Option<Point2> {
    let d1 = a1 - a0;
    let d2 = b1 - b0;

    let cross = cross_2d(&d1, &d2);
    // 平行或退化
    if cross.abs() < EPSILON {
        return None;
    }

    let d = b0 - a0;
    let t = cross_2d(&d, &d2) / cross;
    let u = cross_2d(&d, &d1) / cross;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a0 + d1 * t)
    } else {
        None
    }
}

/// 无限长直线交点
pub fn line_intersection_2d(a0: Point2, a1: Point2, b0: Point2, b1: Point2) -> Option<Point2> {
    let d1 = a1 - a0;
    let d2 = b1 - b0;

    let cross = cross_2d(&d1, &d2);
    if cross.abs() < EPSILON {
        return None;
    }

    let t = cross_2d(&(b0 - a0), &d2) / cross;
    Some(a0 + d1 * t)
}

/// 过三点的圆，返回（圆心，半径）；三点共线时返回 None
pub fn circle_through_three_points(p1: Point2, p2: Point2, p3: Point2) -> Option<(Point2, f64)> {
    let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));

    if d.abs() < EPSILON {
        return None;
    }

    let s1 = p1.x * p1.x + p1.y * p1.y;
    let s2 = p2.x * p2.x + p2.y * p2.y;
    let s3 = p3.x * p3.x + p3.y * p3.y;

    let ux = (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d;
    let uy = (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d;

    let center = Point2::new(ux, uy);
    Some((center, (p1 - center).norm()))
}

/// 点到直线（过 `origin`，方向 `dir` 为单位向量）的投影
#[inline]
pub fn project_point_on_line(point: Point2, origin: Point2, dir: Vector2) -> Point2 {
    origin + dir * (point - origin).dot(&dir)
}

/// 二维包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 空包围盒（min > max）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_to_include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// 三维包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_intersection() {
        let p = segment_intersection_2d(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 5.0).abs() < EPSILON);
        assert!((p.y - 5.0).abs() < EPSILON);

        // 延长线相交但线段不相交
        assert!(segment_intersection_2d(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn test_line_intersection_outside_segments() {
        let p = line_intersection_2d(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(5.0, 4.0),
        )
        .unwrap();
        assert!((p.x - 5.0).abs() < EPSILON);
        assert!(p.y.abs() < EPSILON);

        assert!(line_intersection_2d(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_project_point_on_line() {
        let dir = Vector2::new(1.0, 1.0).normalize();
        let p = project_point_on_line(Point2::new(2.0, 0.0), Point2::origin(), dir);
        assert!((p - Point2::new(1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_circle_through_three_points() {
        let (c, r) = circle_through_three_points(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
        )
        .unwrap();
        assert!(c.coords.norm() < 1e-9);
        assert!((r - 1.0).abs() < 1e-9);

        // 共线
        assert!(circle_through_three_points(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        )
        .is_none());
    }

    #[test]
    fn test_bounding_box3() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 5.0, 2.0)];
        let bbox = BoundingBox3::from_points(pts.iter());
        assert!((bbox.size().z - 2.0).abs() < EPSILON);
        assert!(BoundingBox3::empty().is_empty());
    }
}
