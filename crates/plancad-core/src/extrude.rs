//! 轮廓拉伸网格生成
//!
//! 平面轮廓 -> 底面 + 顶面（耳切三角化）+ 侧面四边形，每个面使用平面法线，
//! 随后按主法线轴做平面投影生成 UV。

use crate::entity::ObjectId;
use crate::error::GeometryError;
use crate::geometry::{signed_area, Geometry, MeshData, Polyline, Profile};
use crate::math::{cross_2d, BoundingBox3, Point2, Point3, Vector3, EPSILON};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};

/// UV 生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UvMode {
    /// 按面法线主轴的平面投影
    Planar,
    /// 缺少法线时所有顶点使用同一个 UV
    Constant,
}

/// 缺少法线时使用的 UV
pub const CONSTANT_UV: [f64; 2] = [0.0, 0.0];

/// 可拉伸的平面轮廓及其所在高度
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarProfile {
    pub profile: Profile,
    /// 轮廓平面的 z 坐标（局部坐标）
    pub elevation: f64,
}

/// 是否为可拉伸的平面封闭轮廓
pub fn can_extrude(geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Profile(_) => true,
        Geometry::Polyline(pl) => closed_planar(pl),
        Geometry::Arc(_) | Geometry::Mesh(_) | Geometry::Segments(_) => false,
    }
}

fn closed_planar(pl: &Polyline) -> bool {
    pl.closed && pl.points.len() >= 3 && pl.is_planar()
}

/// 从几何中提取拉伸轮廓
pub fn extract_profile(geometry: &Geometry) -> Result<PlanarProfile, GeometryError> {
    let planar = match geometry {
        Geometry::Profile(profile) => PlanarProfile {
            profile: profile.clone(),
            elevation: 0.0,
        },
        Geometry::Polyline(pl) if closed_planar(pl) => PlanarProfile {
            profile: Profile::shape(pl.points.iter().map(|p| Point2::new(p.x, p.y)).collect()),
            elevation: pl.points.first().map(|p| p.z).unwrap_or(0.0),
        },
        other => {
            return Err(GeometryError::DegenerateProfile(format!(
                "{} is not a closed planar profile",
                other.type_name()
            )))
        }
    };
    planar.profile.validate()?;
    Ok(planar)
}

/// 提取场景对象的拉伸轮廓
pub fn object_profile(scene: &Scene, id: ObjectId) -> Result<PlanarProfile, GeometryError> {
    let object = scene.get(id).ok_or(GeometryError::ObjectNotFound(id))?;
    match object.geometry.as_ref() {
        Some(geometry) if can_extrude(geometry) => extract_profile(geometry),
        _ => Err(GeometryError::NotExtrudable(id)),
    }
}

/// 拉伸轮廓，生成带法线和 UV 的实体网格（底面位于 z = 0）
pub fn extrude_profile(profile: &Profile, height: f64) -> Result<MeshData, GeometryError> {
    if !height.is_finite() {
        return Err(GeometryError::NonFinite("extrusion height"));
    }
    if height <= 0.0 {
        return Err(GeometryError::DegenerateProfile(format!(
            "non-positive height {height}"
        )));
    }
    profile.validate()?;

    let mut outline = dedup_outline(profile.outline());
    if signed_area(&outline) < 0.0 {
        outline.reverse();
    }
    let triangles = triangulate(&outline)?;
    let n = outline.len();

    let mut mesh = MeshData::default();
    let mut normals = Vec::new();

    // 底面（法线朝下，绕序反转）
    let base = mesh.positions.len() as u32;
    for p in &outline {
        mesh.positions.push(Point3::new(p.x, p.y, 0.0));
        normals.push(-Vector3::z());
    }
    for [a, b, c] in &triangles {
        mesh.indices
            .push([base + *a as u32, base + *c as u32, base + *b as u32]);
    }

    // 顶面
    let top = mesh.positions.len() as u32;
    for p in &outline {
        mesh.positions.push(Point3::new(p.x, p.y, height));
        normals.push(Vector3::z());
    }
    for [a, b, c] in &triangles {
        mesh.indices
            .push([top + *a as u32, top + *b as u32, top + *c as u32]);
    }

    // 侧面：每条边一个独立四边形
    for i in 0..n {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % n];
        let edge = p1 - p0;
        let outward = Vector3::new(edge.y, -edge.x, 0.0)
            .try_normalize(EPSILON)
            .unwrap_or_else(Vector3::zeros);

        let start = mesh.positions.len() as u32;
        mesh.positions.extend([
            Point3::new(p0.x, p0.y, 0.0),
            Point3::new(p1.x, p1.y, 0.0),
            Point3::new(p1.x, p1.y, height),
            Point3::new(p0.x, p0.y, height),
        ]);
        normals.extend([outward; 4]);
        mesh.indices.push([start, start + 1, start + 2]);
        mesh.indices.push([start, start + 2, start + 3]);
    }

    mesh.normals = Some(normals);
    generate_uvs(&mut mesh);

    tracing::trace!(
        "Extruded {} profile: {} vertices, {} triangles",
        profile.kind().name(),
        mesh.positions.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// 去掉相邻重复点与首尾重复点
fn dedup_outline(mut outline: Vec<Point2>) -> Vec<Point2> {
    outline.dedup_by(|a, b| (*a - *b).norm() < EPSILON);
    while outline.len() > 1 {
        match (outline.first(), outline.last()) {
            (Some(first), Some(last)) if (*first - *last).norm() < EPSILON => {
                outline.pop();
            }
            _ => break,
        }
    }
    outline
}

/// 耳切法三角化（输入为逆时针多边形）
pub fn triangulate(outline: &[Point2]) -> Result<Vec<[usize; 3]>, GeometryError> {
    if outline.len() < 3 {
        return Err(GeometryError::Triangulation(format!(
            "{} vertices",
            outline.len()
        )));
    }

    let mut remaining: Vec<usize> = (0..outline.len()).collect();
    let mut triangles = Vec::with_capacity(outline.len() - 2);

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut found_ear = false;

        for i in 0..n {
            let prev = remaining[(i + n - 1) % n];
            let curr = remaining[i];
            let next = remaining[(i + 1) % n];

            let a = outline[prev];
            let b = outline[curr];
            let c = outline[next];

            // 凸顶点才可能是耳朵
            if cross_2d(&(b - a), &(c - a)) <= EPSILON {
                continue;
            }

            let is_ear = remaining
                .iter()
                .filter(|&&j| j != prev && j != curr && j != next)
                .all(|&j| !point_in_triangle(outline[j], a, b, c));

            if is_ear {
                triangles.push([prev, curr, next]);
                remaining.remove(i);
                found_ear = true;
                break;
            }
        }

        if !found_ear {
            return Err(GeometryError::Triangulation(format!(
                "no ear found with {} vertices left",
                remaining.len()
            )));
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    Ok(triangles)
}

fn point_in_triangle(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    let d1 = cross_2d(&(b - a), &(p - a));
    let d2 = cross_2d(&(c - b), &(p - b));
    let d3 = cross_2d(&(a - c), &(p - c));

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// 生成 UV
///
/// 每个顶点按其法线的主轴选择投影平面（x 主轴 -> ZY，y 主轴 -> XZ，z 主轴 -> XY），
/// 用整体包围盒归一化到 [0, 1]。没有法线时退化为常量 UV。
pub fn generate_uvs(mesh: &mut MeshData) -> UvMode {
    let count = mesh.positions.len();
    let normals = match &mesh.normals {
        Some(normals) if normals.len() == count => normals,
        _ => {
            mesh.uvs = vec![CONSTANT_UV; count];
            tracing::debug!("UV fallback: constant UV for {} vertices", count);
            return UvMode::Constant;
        }
    };

    let bbox = BoundingBox3::from_points(mesh.positions.iter());
    let size = bbox.size();
    let extent = |v: f64| if v.abs() < EPSILON { 1.0 } else { v };
    let (sx, sy, sz) = (extent(size.x), extent(size.y), extent(size.z));

    mesh.uvs = mesh
        .positions
        .iter()
        .zip(normals)
        .map(|(p, n)| {
            let u = (p.x - bbox.min.x) / sx;
            let v = (p.y - bbox.min.y) / sy;
            let w = (p.z - bbox.min.z) / sz;
            let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
            if ax >= ay && ax >= az {
                [w, v]
            } else if ay >= az {
                [u, w]
            } else {
                [u, v]
            }
        })
        .collect();
    UvMode::Planar
}
