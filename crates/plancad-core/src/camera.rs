//! 相机与屏幕投影
//!
//! 捕捉距离以屏幕像素比较，因此需要把世界坐标点投影到屏幕。
//! 屏幕坐标原点在左上角，y 轴向下。

use crate::math::{Point2, Point3, Vector2, Vector3};
use nalgebra::{Isometry3, Matrix4, Orthographic3, Perspective3};

/// 相机（视图投影矩阵 + 视口像素尺寸）
#[derive(Debug, Clone)]
pub struct Camera {
    view_projection: Matrix4<f64>,
    /// 视口宽高（像素）
    viewport: Vector2,
}

impl Camera {
    pub fn new(view_projection: Matrix4<f64>, viewport: Vector2) -> Self {
        Self {
            view_projection,
            viewport,
        }
    }

    /// 俯视正交相机
    ///
    /// - `center`: 视口中心对应的世界坐标
    /// - `pixels_per_unit`: 每个世界单位对应的像素数（缩放级别）
    pub fn top_down(center: Point2, pixels_per_unit: f64, viewport: Vector2) -> Self {
        let half_w = viewport.x / pixels_per_unit / 2.0;
        let half_h = viewport.y / pixels_per_unit / 2.0;

        let eye = Point3::new(center.x, center.y, 1000.0);
        let target = Point3::new(center.x, center.y, 0.0);
        let view = Isometry3::look_at_rh(&eye, &target, &Vector3::y());
        let projection = Orthographic3::new(-half_w, half_w, -half_h, half_h, 0.1, 10_000.0);

        Self::new(projection.to_homogeneous() * view.to_homogeneous(), viewport)
    }

    /// 透视相机
    pub fn perspective(eye: Point3, target: Point3, fovy: f64, viewport: Vector2) -> Self {
        let view = Isometry3::look_at_rh(&eye, &target, &Vector3::z());
        let aspect = viewport.x / viewport.y.max(1.0);
        let projection = Perspective3::new(aspect, fovy, 0.1, 10_000.0);

        Self::new(projection.to_homogeneous() * view.to_homogeneous(), viewport)
    }

    pub fn viewport(&self) -> Vector2 {
        self.viewport
    }

    /// 世界坐标 -> 屏幕像素坐标；点在相机后方时返回 None
    pub fn project(&self, point: &Point3) -> Option<Point2> {
        let clip = self.view_projection * point.to_homogeneous();
        if clip.w <= f64::EPSILON {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;

        Some(Point2::new(
            (ndc_x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc_y) * 0.5 * self.viewport.y,
        ))
    }

    /// 世界点到屏幕点的像素距离；无法投影时为无穷大
    pub fn screen_distance(&self, point: &Point3, screen: &Point2) -> f64 {
        self.project(point)
            .map(|p| (p - *screen).norm())
            .unwrap_or(f64::INFINITY)
    }
}
