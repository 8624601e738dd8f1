//! 远距约束捕捉
//!
//! 仅在多点绘图会话已有锚点时生效。依次测试：
//! 水平/垂直对齐、平行、垂直、交点投影、远距中点。
//! 取屏幕距离最小者，相等时先测试的类型优先。

use super::{nearest, SnapCandidate, SnapKind, SnapQuery, GUIDE_COLOR, REFERENCE_COLOR};
use crate::entity::ObjectId;
use crate::geometry::{Feature, Segment};
use crate::guide::GuideLine;
use crate::math::{cross_2d, line_intersection_2d, project_point_on_line, xy, Point3, Vector2};

pub(super) fn collect(query: &SnapQuery<'_>) -> Option<SnapCandidate> {
    let anchor = query.context.anchor()?;
    let segments = query.segments();

    let mut candidates = Vec::new();
    candidates.extend(alignment(query, anchor));
    candidates.extend(parallel_and_perpendicular(query, anchor, &segments));
    candidates.extend(intersection_projection(query, anchor, &segments));
    candidates.extend(distant_center(query, anchor, &segments));

    let best = nearest(candidates)?;
    tracing::trace!("Distant snap {:?} ({:.1}px)", best.kind, best.distance_px);
    Some(best)
}

/// 对齐参考点：已有对象的端点与锚点之前放置的点
fn reference_points(query: &SnapQuery<'_>) -> Vec<Point3> {
    let mut points = Vec::new();
    for id in query.scene.snap_targets() {
        for feature in query.scene.world_features(id) {
            match feature {
                Feature::Straight(s) => {
                    points.push(s.start);
                    points.push(s.end);
                }
                Feature::Curved(a) if !a.is_full_circle() => {
                    points.push(a.start_point());
                    points.push(a.end_point());
                }
                Feature::Curved(_) => {}
            }
        }
    }
    let placed = &query.context.points;
    points.extend(placed[..placed.len().saturating_sub(1)].iter().copied());
    points
}

fn alignment(query: &SnapQuery<'_>, anchor: Point3) -> Vec<SnapCandidate> {
    let threshold = query.config.distant_snap_distance_px;
    let tolerance = query.config.alignment_tolerance;
    let raw = query.raw;
    let mut candidates = Vec::new();

    for target in reference_points(query) {
        if (raw.y - target.y).abs() < tolerance {
            let point = Point3::new(raw.x, target.y, raw.z);
            if let Some(c) = query.candidate(point, SnapKind::DistantAlignH, threshold) {
                candidates.push(c.with_guides(vec![
                    GuideLine::solid(anchor, point, GUIDE_COLOR),
                    GuideLine::dashed(target, point, REFERENCE_COLOR),
                ]));
            }
        }
        if (raw.x - target.x).abs() < tolerance {
            let point = Point3::new(target.x, raw.y, raw.z);
            if let Some(c) = query.candidate(point, SnapKind::DistantAlignV, threshold) {
                candidates.push(c.with_guides(vec![
                    GuideLine::solid(anchor, point, GUIDE_COLOR),
                    GuideLine::dashed(target, point, REFERENCE_COLOR),
                ]));
            }
        }
    }
    candidates
}

fn parallel_and_perpendicular(
    query: &SnapQuery<'_>,
    anchor: Point3,
    segments: &[(ObjectId, Segment)],
) -> Vec<SnapCandidate> {
    let threshold = query.config.distant_snap_distance_px;
    let origin = xy(&anchor);
    let offset = xy(&query.raw) - origin;
    let Some(ghost) = offset.try_normalize(f64::EPSILON) else {
        return Vec::new();
    };

    let project = |dir: Vector2| {
        let p = project_point_on_line(xy(&query.raw), origin, dir);
        Point3::new(p.x, p.y, query.raw.z)
    };

    let mut parallel = Vec::new();
    let mut perpendicular = Vec::new();
    for (_, segment) in segments {
        let Some(dir) = segment.direction_2d() else {
            continue;
        };
        let reference = GuideLine::dashed(segment.start, segment.end, REFERENCE_COLOR);

        if cross_2d(&ghost, &dir).abs() < query.config.parallel_tolerance {
            let point = project(dir);
            if let Some(c) = query.candidate(point, SnapKind::Parallel, threshold) {
                parallel.push(c.with_guides(vec![
                    GuideLine::solid(anchor, point, GUIDE_COLOR),
                    reference,
                ]));
            }
        }
        if ghost.dot(&dir).abs() < query.config.perpendicular_tolerance {
            let point = project(Vector2::new(-dir.y, dir.x));
            if let Some(c) = query.candidate(point, SnapKind::Perpendicular, threshold) {
                perpendicular.push(c.with_guides(vec![
                    GuideLine::solid(anchor, point, GUIDE_COLOR),
                    reference,
                ]));
            }
        }
    }
    parallel.extend(perpendicular);
    parallel
}

/// 两条无关直线（不同对象且无公共端点）的延长线交点，与锚点水平或垂直对齐
fn intersection_projection(
    query: &SnapQuery<'_>,
    anchor: Point3,
    segments: &[(ObjectId, Segment)],
) -> Vec<SnapCandidate> {
    if !query.config.enabled.is_enabled(SnapKind::IntersectionProjection) {
        return Vec::new();
    }
    let threshold = query.config.distant_snap_distance_px;
    let tolerance = query.config.alignment_tolerance;
    let z = query.raw.z;
    let mut candidates = Vec::new();

    for (i, (id_a, a)) in segments.iter().enumerate() {
        for (id_b, b) in &segments[i + 1..] {
            if id_a == id_b || a.shares_endpoint(b) {
                continue;
            }
            let Some(x) = line_intersection_2d(a.start_2d(), a.end_2d(), b.start_2d(), b.end_2d())
            else {
                continue;
            };
            let crossing = Point3::new(x.x, x.y, z);
            let references = [
                GuideLine::dashed(nearest_end(a, &crossing), crossing, REFERENCE_COLOR),
                GuideLine::dashed(nearest_end(b, &crossing), crossing, REFERENCE_COLOR),
            ];

            let mut aligned = Vec::new();
            if (x.y - anchor.y).abs() < tolerance {
                aligned.push(Point3::new(x.x, anchor.y, z));
            }
            if (x.x - anchor.x).abs() < tolerance {
                aligned.push(Point3::new(anchor.x, x.y, z));
            }
            for point in aligned {
                if let Some(c) = query.candidate(point, SnapKind::IntersectionProjection, threshold)
                {
                    let mut guides = vec![GuideLine::solid(anchor, point, GUIDE_COLOR)];
                    guides.extend(references);
                    candidates.push(c.with_guides(guides));
                }
            }
        }
    }
    candidates
}

fn nearest_end(segment: &Segment, p: &Point3) -> Point3 {
    if (segment.start - *p).norm() <= (segment.end - *p).norm() {
        segment.start
    } else {
        segment.end
    }
}

/// 指针与线段中点水平或垂直对齐
fn distant_center(
    query: &SnapQuery<'_>,
    anchor: Point3,
    segments: &[(ObjectId, Segment)],
) -> Vec<SnapCandidate> {
    let threshold = query.config.distant_snap_distance_px;
    let tolerance = query.config.alignment_tolerance;
    let raw = query.raw;
    let mut candidates = Vec::new();

    for (_, segment) in segments {
        let mid = segment.midpoint();
        let mut aligned = Vec::new();
        if (raw.x - mid.x).abs() < tolerance {
            aligned.push(Point3::new(mid.x, raw.y, raw.z));
        }
        if (raw.y - mid.y).abs() < tolerance {
            aligned.push(Point3::new(raw.x, mid.y, raw.z));
        }
        for point in aligned {
            if let Some(c) = query.candidate(point, SnapKind::DistantCenter, threshold) {
                candidates.push(c.with_guides(vec![
                    GuideLine::solid(anchor, point, GUIDE_COLOR),
                    GuideLine::dashed(mid, point, REFERENCE_COLOR),
                ]));
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add_line, camera, screen};
    use super::super::*;

    fn run(scene: &Scene, ctx: &DrawingContext, x: f64, y: f64) -> Option<SnapCandidate> {
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

    fn anchored(x: f64, y: f64) -> DrawingContext {
        DrawingContext::drawing(ToolKind::Line, vec![Point3::new(x, y, 0.0)])
    }

    #[test]
    fn test_requires_anchor() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 5.0), (10.0, 5.0));
        let ctx = DrawingContext::drawing(ToolKind::Line, vec![]);
        assert!(run(&scene, &ctx, 30.0, 5.2).is_none());
    }

    #[test]
    fn test_vertical_alignment_with_placed_point() {
        let scene = Scene::new();
        let ctx = DrawingContext::drawing(
            ToolKind::Polyline,
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 0.0)],
        );

        let best = run(&scene, &ctx, 0.3, 20.0).unwrap();
        assert_eq!(best.kind, SnapKind::DistantAlignV);
        assert!(best.point.x.abs() < 1e-9);
        assert!((best.point.y - 20.0).abs() < 1e-9);
        assert_eq!(best.guides.len(), 2);
    }

    #[test]
    fn test_parallel_to_segment() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 10.0));
        let ctx = anchored(20.0, 0.0);

        // 锚点出发、接近 45° 方向
        let best = run(&scene, &ctx, 30.0, 10.4).unwrap();
        assert_eq!(best.kind, SnapKind::Parallel);
        assert!((best.point.x - 20.0 - (best.point.y)).abs() < 1e-9);
    }

    #[test]
    fn test_perpendicular_to_segment() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 10.0));
        let ctx = anchored(30.0, 0.0);

        let best = run(&scene, &ctx, 24.4, 6.0).unwrap();
        assert_eq!(best.kind, SnapKind::Perpendicular);
        // 垂线方向 (-1, 1)
        assert!(((best.point.x - 30.0) + best.point.y).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_wins_tie_with_perpendicular() {
        let mut scene = Scene::new();
        // 竖线先加入：它的垂直候选与横线的平行候选落在同一点
        add_line(&mut scene, (20.0, -5.0), (20.0, 5.0));
        add_line(&mut scene, (0.0, 0.0), (10.0, 0.0));
        let ctx = anchored(50.0, 50.0);

        let best = run(&scene, &ctx, 70.0, 50.8).unwrap();
        assert_eq!(best.kind, SnapKind::Parallel);
        assert!((best.point.x - 70.0).abs() < 1e-9);
        assert!((best.point.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_projection() {
        let mut scene = Scene::new();
        // 延长线交于 (20, 20)
        add_line(&mut scene, (0.0, 0.0), (5.0, 5.0));
        add_line(&mut scene, (40.0, 0.0), (35.0, 5.0));
        let ctx = anchored(-30.0, 20.2);

        let best = run(&scene, &ctx, 20.0, 20.6).unwrap();
        assert_eq!(best.kind, SnapKind::IntersectionProjection);
        assert!((best.point.x - 20.0).abs() < 1e-9);
        assert!((best.point.y - 20.2).abs() < 1e-9);
    }

    #[test]
    fn test_distant_center() {
        let mut scene = Scene::new();
        add_line(&mut scene, (0.0, 0.0), (10.0, 0.0));
        let ctx = anchored(-20.0, 30.0);

        let best = run(&scene, &ctx, 5.3, 40.0).unwrap();
        assert_eq!(best.kind, SnapKind::DistantCenter);
        assert!((best.point.x - 5.0).abs() < 1e-9);
        assert!((best.point.y - 40.0).abs() < 1e-9);
    }
}
