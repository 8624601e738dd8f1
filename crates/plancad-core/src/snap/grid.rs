//! 网格捕捉与回退

use super::{nearest, SnapCandidate, SnapConfig, SnapKind, SnapQuery, SnapResult};
use crate::math::Point3;

/// 原始点周围 3x3 个网格单元的角点中，屏幕距离最近且在阈值内者
pub(super) fn corner(query: &SnapQuery<'_>) -> Option<SnapCandidate> {
    let spacing = query.config.grid_spacing;
    if spacing <= 0.0 || !spacing.is_finite() {
        return None;
    }
    let threshold = query.config.snap_distance_px;
    let raw = query.raw;
    let cell_x = (raw.x / spacing).floor();
    let cell_y = (raw.y / spacing).floor();

    let corners = (-1..=2).flat_map(|i| {
        (-1..=2).map(move |j| {
            Point3::new(
                (cell_x + i as f64) * spacing,
                (cell_y + j as f64) * spacing,
                raw.z,
            )
        })
    });
    nearest(corners.filter_map(|p| query.candidate(p, SnapKind::GridCorner, threshold)))
}

/// 回退：开启网格吸附时取最近的网格倍数，否则返回原始点
pub(super) fn fallback(raw: Point3, config: &SnapConfig) -> SnapResult {
    let spacing = config.grid_spacing;
    if config.snap_to_grid && spacing > 0.0 && spacing.is_finite() {
        SnapResult::raw(Point3::new(
            (raw.x / spacing).round() * spacing,
            (raw.y / spacing).round() * spacing,
            raw.z,
        ))
    } else {
        SnapResult::raw(raw)
    }
}
