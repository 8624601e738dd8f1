//! 交点捕捉
//!
//! - 不同对象的线段两两求交
//! - 正在绘制的幽灵线段（锚点 -> 当前原始点）与所有已有线段求交

use super::{SnapCandidate, SnapKind, SnapQuery};
use crate::geometry::Segment;
use crate::math::{segment_intersection_2d, Point3};

/// 与锚点重合的交点视为无效
const ANCHOR_EPSILON: f64 = 1e-6;

fn intersect(a: &Segment, b: &Segment) -> Option<Point3> {
    segment_intersection_2d(a.start_2d(), a.end_2d(), b.start_2d(), b.end_2d())
        .map(|p| Point3::new(p.x, p.y, a.start.z))
}

pub(super) fn collect(query: &SnapQuery<'_>) -> Vec<SnapCandidate> {
    let threshold = query.config.snap_distance_px;
    let anchor = query.context.anchor();
    let at_anchor = |p: &Point3| {
        anchor.is_some_and(|a| (a.x - p.x).hypot(a.y - p.y) < ANCHOR_EPSILON)
    };

    let segments = query.segments();
    let mut candidates = Vec::new();

    if query.config.enabled.is_enabled(SnapKind::Intersection) {
        for (i, (id_a, seg_a)) in segments.iter().enumerate() {
            for (id_b, seg_b) in &segments[i + 1..] {
                if id_a == id_b {
                    continue;
                }
                let Some(p) = intersect(seg_a, seg_b) else {
                    continue;
                };
                if at_anchor(&p) {
                    continue;
                }
                candidates.extend(query.candidate(p, SnapKind::Intersection, threshold));
            }
        }
    }

    if let Some(anchor) = anchor {
        let ghost = Segment::new(anchor, query.raw);
        if ghost.direction_2d().is_some() {
            for (_, seg) in &segments {
                let Some(p) = intersect(&ghost, seg) else {
                    continue;
                };
                if at_anchor(&p) {
                    continue;
                }
                candidates.extend(query.candidate(p, SnapKind::GhostIntersection, threshold));
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add_line, camera, screen};
    use super::super::*;
    use crate::geometry::{Geometry, Polyline};
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
    fn test_pairs_of_different_objects_only() {
        let mut scene = Scene::new();
        // 自相交的闭合多段线不产生交点
        scene.add(SceneObject::line(
            "Bowtie",
            Geometry::Polyline(Polyline::new(
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(10.0, 10.0, 0.0),
                    Point3::new(10.0, 0.0, 0.0),
                    Point3::new(0.0, 10.0, 0.0),
                ],
                true,
            )),
        ));
        let idle = DrawingContext::idle();
        assert!(run(&scene, &idle, 5.0, 5.0).is_empty());

        add_line(&mut scene, (5.0, -5.0), (5.0, 20.0));
        // 竖线与两条对角线各交于 (5,5)
        let hits = run(&scene, &idle, 5.0, 5.0);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.kind == SnapKind::Intersection));
    }

    #[test]
    fn test_ghost_segment_crossing() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 5.0), (10.0, 5.0));
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![Point3::new(3.0, 0.0, 0.0)]);

        let hits = run(&scene, &ctx, 3.0, 5.3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, SnapKind::GhostIntersection);
        assert!((hits[0].point.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_ghost_ignores_anchor_on_segment() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 0.0));
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![Point3::new(5.0, 0.0, 0.0)]);

        assert!(run(&scene, &ctx, 5.0, 0.5).is_empty());
    }
}
