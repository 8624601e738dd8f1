//! 绘制直线 / 多段线 / 矩形

use crate::action::{DoubleClickable, RightClickable, Tool, ToolContext, ToolOutcome, ValueInput};
use plancad_core::geometry::{Geometry, Polyline, Profile};
use plancad_core::math::{Point2, Point3, Vector3};
use plancad_core::scene::{SceneObject, Transform};
use plancad_core::snap::{DrawingContext, ToolKind};

/// 点重合判定
const COINCIDENT: f64 = 1e-6;

/// 绘制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// 两点直线
    Line,
    /// 多点多段线，点回起点时闭合
    Polyline,
    /// 两个对角点确定的矩形轮廓
    Rectangle,
}

/// 绘制状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待第一点
    SetFirstPoint,
    /// 等待下一点
    SetNextPoint,
}

/// 多点绘图工具
#[derive(Debug)]
pub struct DrawPolylineTool {
    mode: DrawMode,
    status: Status,
    points: Vec<Point3>,
    /// 最近一次指针位置（捕捉后）
    cursor: Option<Point3>,
}

impl DrawPolylineTool {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            status: Status::SetFirstPoint,
            points: Vec::new(),
            cursor: None,
        }
    }

    pub fn line() -> Self {
        Self::new(DrawMode::Line)
    }

    pub fn polyline() -> Self {
        Self::new(DrawMode::Polyline)
    }

    pub fn rectangle() -> Self {
        Self::new(DrawMode::Rectangle)
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// 已放置的点
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    fn place(&mut self, point: Point3) -> ToolOutcome {
        let Some(&first) = self.points.first() else {
            self.points.push(point);
            self.status = Status::SetNextPoint;
            return ToolOutcome::Continue;
        };
        if self
            .points
            .last()
            .is_some_and(|last| (point - *last).norm() < COINCIDENT)
        {
            return ToolOutcome::Continue;
        }

        match self.mode {
            DrawMode::Line => {
                let object = SceneObject::line("Ligne", Geometry::Polyline(Polyline::line(first, point)));
                self.reset();
                ToolOutcome::Create(vec![object])
            }
            DrawMode::Rectangle => self.rectangle_to(first, point),
            DrawMode::Polyline => {
                if self.points.len() >= 3 && (point - first).norm() < COINCIDENT {
                    return self.finish(true);
                }
                self.points.push(point);
                ToolOutcome::Continue
            }
        }
    }

    fn rectangle_to(&mut self, first: Point3, corner: Point3) -> ToolOutcome {
        if (corner.x - first.x).abs() < COINCIDENT || (corner.y - first.y).abs() < COINCIDENT {
            return ToolOutcome::Message("Rectangle dégénéré".to_string());
        }
        let profile = Profile::rectangle(Point2::new(first.x, first.y), Point2::new(corner.x, corner.y));
        let object = SceneObject::mesh("Rectangle", Geometry::Profile(profile))
            .with_transform(Transform::from_translation(Vector3::new(0.0, 0.0, first.z)));
        self.reset();
        ToolOutcome::Create(vec![object])
    }

    /// 结束多段线；点数不足时放弃
    fn finish(&mut self, closed: bool) -> ToolOutcome {
        let points = std::mem::take(&mut self.points);
        self.reset();
        let enough = if closed { points.len() >= 3 } else { points.len() >= 2 };
        if self.mode != DrawMode::Polyline || !enough {
            return ToolOutcome::Continue;
        }
        let object = SceneObject::line("Polyligne", Geometry::Polyline(Polyline::new(points, closed)));
        ToolOutcome::Create(vec![object])
    }
}

impl Tool for DrawPolylineTool {
    fn kind(&self) -> ToolKind {
        match self.mode {
            DrawMode::Line => ToolKind::Line,
            DrawMode::Polyline => ToolKind::Polyline,
            DrawMode::Rectangle => ToolKind::Rectangle,
        }
    }

    fn name(&self) -> &'static str {
        match self.mode {
            DrawMode::Line => "Ligne",
            DrawMode::Polyline => "Polyligne",
            DrawMode::Rectangle => "Rectangle",
        }
    }

    fn reset(&mut self) {
        self.status = Status::SetFirstPoint;
        self.points.clear();
    }

    fn drawing_context(&self) -> DrawingContext {
        DrawingContext::drawing(self.kind(), self.points.clone())
    }

    fn on_pointer_move(&mut self, ctx: &ToolContext) -> ToolOutcome {
        self.cursor = Some(ctx.point);
        ToolOutcome::Continue
    }

    fn on_click(&mut self, ctx: &ToolContext) -> ToolOutcome {
        self.cursor = Some(ctx.point);
        self.place(ctx.point)
    }

    fn prompt(&self) -> &str {
        match (self.status, self.mode) {
            (Status::SetFirstPoint, _) => "Spécifiez le premier point",
            (Status::SetNextPoint, DrawMode::Rectangle) => "Spécifiez le coin opposé",
            (Status::SetNextPoint, DrawMode::Polyline) if self.points.len() >= 3 => {
                "Spécifiez le point suivant ou cliquez sur le premier point pour fermer"
            }
            (Status::SetNextPoint, _) => "Spécifiez le point suivant",
        }
    }

    fn as_right_clickable(&mut self) -> Option<&mut dyn RightClickable> {
        Some(self)
    }

    fn as_double_clickable(&mut self) -> Option<&mut dyn DoubleClickable> {
        Some(self)
    }

    fn as_value_input(&mut self) -> Option<&mut dyn ValueInput> {
        Some(self)
    }
}

impl RightClickable for DrawPolylineTool {
    fn on_right_click(&mut self, _ctx: &ToolContext) -> ToolOutcome {
        // 右键结束多段线（不闭合）
        self.finish(false)
    }
}

impl DoubleClickable for DrawPolylineTool {
    fn on_double_click(&mut self, _ctx: &ToolContext) -> ToolOutcome {
        self.finish(false)
    }
}

impl ValueInput for DrawPolylineTool {
    /// 沿指针方向放置指定长度的点；矩形模式下为正方形边长
    fn on_value(&mut self, ctx: &ToolContext, value: f64) -> ToolOutcome {
        if !value.is_finite() || value <= 0.0 {
            return ToolOutcome::Message("Longueur invalide".to_string());
        }
        let Some(&last) = self.points.last() else {
            return ToolOutcome::Message("Spécifiez d'abord le premier point".to_string());
        };
        let offset = self.cursor.unwrap_or(ctx.point) - last;

        let target = match self.mode {
            DrawMode::Rectangle => {
                let sign = |v: f64| if v < 0.0 { -1.0 } else { 1.0 };
                last + Vector3::new(sign(offset.x) * value, sign(offset.y) * value, 0.0)
            }
            DrawMode::Line | DrawMode::Polyline => match offset.try_normalize(COINCIDENT) {
                Some(dir) => last + dir * value,
                None => return ToolOutcome::Message("Direction indéfinie".to_string()),
            },
        };
        self.place(target)
    }
}
