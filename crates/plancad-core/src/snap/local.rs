//! 局部点捕捉：已有几何上的特征点与正在绘制的点

use super::{SnapCandidate, SnapKind, SnapQuery};
use crate::geometry::Feature;
use crate::math::Point3;

/// 直线段上的比例点
const STRAIGHT_FRACTIONS: [(f64, SnapKind); 5] = [
    (0.5, SnapKind::Midpoint),
    (0.25, SnapKind::Quarter),
    (0.75, SnapKind::Quarter),
    (1.0 / 3.0, SnapKind::Third),
    (2.0 / 3.0, SnapKind::Third),
];

/// 圆弧上的弧长比例点
const ARC_FRACTIONS: [(f64, SnapKind); 3] = [
    (0.25, SnapKind::Quarter),
    (0.5, SnapKind::Midpoint),
    (0.75, SnapKind::Quarter),
];

/// 阈值内的所有局部点候选（按发现顺序）
pub(super) fn collect(query: &SnapQuery<'_>) -> Vec<SnapCandidate> {
    let threshold = query.config.snap_distance_px;
    let mut points: Vec<(Point3, SnapKind)> = Vec::new();

    for id in query.scene.snap_targets() {
        for feature in query.scene.world_features(id) {
            match feature {
                Feature::Straight(segment) => {
                    points.push((segment.start, SnapKind::Endpoint));
                    points.push((segment.end, SnapKind::Endpoint));
                    for (t, kind) in STRAIGHT_FRACTIONS {
                        points.push((segment.point_at(t), kind));
                    }
                }
                Feature::Curved(arc) => {
                    if !arc.is_full_circle() {
                        points.push((arc.start_point(), SnapKind::Endpoint));
                        points.push((arc.end_point(), SnapKind::Endpoint));
                    }
                    points.push((arc.center, SnapKind::Center));
                    for (t, kind) in ARC_FRACTIONS {
                        points.push((arc.point_at_fraction(t), kind));
                    }
                }
            }
        }
    }

    // 正在绘制的路径：锚点及之前放置的点
    for p in query.context.points.iter().rev() {
        points.push((*p, SnapKind::Endpoint));
    }

    points
        .into_iter()
        .filter_map(|(p, kind)| query.candidate(p, kind, threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add_line, camera, screen};
    use super::super::*;
    use crate::geometry::{Arc, Geometry};
    use crate::scene::SceneObject;

    fn run(scene: &Scene, ctx: &DrawingContext, x: f64, y: f64) -> Vec<SnapCandidate> {
        let cam = camera();
        let config = SnapConfig::default();
        let query = SnapQuery {
            scene,
            camera: &cam,
            raw: Point3::new(x, y, 0.0),
            pointer: screen(&cam, x, y),
            context: ctx,
            config: &config,
        };
        super::collect(&query)
    }

    #[test]
    fn test_straight_fraction_points() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (24.0, 0.0));
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);

        let kinds = |x: f64| -> Vec<SnapKind> {
            run(&scene, &ctx, x, 0.0).iter().map(|c| c.kind).collect()
        };
        assert_eq!(kinds(6.0), vec![SnapKind::Quarter]);
        assert_eq!(kinds(8.0), vec![SnapKind::Third]);
        assert_eq!(kinds(12.0), vec![SnapKind::Midpoint]);
        assert_eq!(kinds(24.0), vec![SnapKind::Endpoint]);
    }

    #[test]
    fn test_arc_center_and_quarter() {
        let mut scene = Scene::new();
        scene.add(SceneObject::line(
            "Arc",
            Geometry::Arc(Arc::new(Point3::origin(), 5.0, 0.0, std::f64::consts::PI)),
        ));
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);

        let at_center = run(&scene, &ctx, 0.0, 0.0);
        assert_eq!(at_center[0].kind, SnapKind::Center);

        // 50% 弧长点 (0,5) 视为中点，而非三分点
        let at_top = run(&scene, &ctx, 0.0, 5.0);
        assert_eq!(at_top.len(), 1);
        assert_eq!(at_top[0].kind, SnapKind::Midpoint);
    }

    #[test]
    fn test_in_progress_points() {
        let scene = Scene::new();
        let ctx = DrawingContext::drawing(
            ToolKind::Polyline,
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 5.0, 0.0)],
        );

        let back_to_start = run(&scene, &ctx, 0.2, 0.1);
        assert_eq!(back_to_start.len(), 1);
        assert_eq!(back_to_start[0].kind, SnapKind::Endpoint);
        assert!(back_to_start[0].point.coords.norm() < 1e-9);
    }
}
