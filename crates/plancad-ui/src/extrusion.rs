//! 拉伸会话
//!
//! 同一时间最多一个会话。会话期间源轮廓被隐藏（不删除），
//! 预览实体随指针的竖直位移更新；提交时源对象被移除，预览成为正式对象。

use crate::config::ExtrusionConfig;
use crate::status::StatusSink;
use plancad_core::attributes::{ElementClass, ExtrusionInfo};
use plancad_core::entity::ObjectId;
use plancad_core::error::GeometryError;
use plancad_core::extrude::{can_extrude, extrude_profile, object_profile, PlanarProfile};
use plancad_core::geometry::{Geometry, MeshData};
use plancad_core::history::{HistoryAction, HistoryEntry, HistoryLog, HistoryPayload};
use plancad_core::scene::{NodeRole, Scene, SceneObject};
use plancad_core::throttle::Throttle;
use std::time::Instant;

/// 高度变化小于该值时不重新生成
const HEIGHT_EPSILON: f64 = 1e-9;

/// 进行中的拉伸会话
#[derive(Debug, Clone)]
pub struct ExtrusionSession {
    source: ObjectId,
    /// 会话开始时提取并缓存的轮廓
    profile: PlanarProfile,
    start_y: f64,
    height: f64,
    preview: ObjectId,
    locked: bool,
}

impl ExtrusionSession {
    pub fn source(&self) -> ObjectId {
        self.source
    }

    pub fn preview(&self) -> ObjectId {
        self.preview
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// 拉伸流程
#[derive(Debug)]
pub struct ExtrusionPipeline {
    config: ExtrusionConfig,
    session: Option<ExtrusionSession>,
    throttle: Throttle,
    /// 预览网格的生成次数
    regenerations: usize,
}

impl ExtrusionPipeline {
    pub fn new(config: ExtrusionConfig) -> Self {
        let throttle = Throttle::from_millis(config.preview_throttle_ms);
        Self {
            config,
            session: None,
            throttle,
            regenerations: 0,
        }
    }

    pub fn config(&self) -> &ExtrusionConfig {
        &self.config
    }

    /// 对象是否为可拉伸的平面封闭轮廓
    pub fn can_extrude(&self, scene: &Scene, id: ObjectId) -> bool {
        scene
            .get(id)
            .and_then(|o| o.geometry.as_ref())
            .is_some_and(can_extrude)
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ExtrusionSession> {
        self.session.as_ref()
    }

    pub fn height(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.height)
    }

    pub fn regenerations(&self) -> usize {
        self.regenerations
    }

    /// 像素位移 -> 量化高度
    pub fn quantize(&self, delta_px: f64) -> f64 {
        let step = self.config.step;
        let height = (delta_px.abs() * self.config.pixel_scale / step).round() * step;
        height.max(self.config.min_height)
    }

    /// 开始会话：隐藏源对象并以最小高度创建预览
    pub fn start_session(
        &mut self,
        scene: &mut Scene,
        id: ObjectId,
        screen_y: f64,
        status: &mut dyn StatusSink,
    ) -> bool {
        if self.session.is_some() {
            status.post("Une extrusion est déjà en cours".to_string());
            return false;
        }
        let built = object_profile(scene, id).and_then(|profile| {
            let mesh = solid_mesh(&profile, self.config.min_height)?;
            Ok((profile, mesh))
        });
        let (profile, mesh) = match built {
            Ok(built) => built,
            Err(GeometryError::NotExtrudable(_) | GeometryError::ObjectNotFound(_)) => {
                status.post("Cet objet ne peut pas être extrudé".to_string());
                return false;
            }
            Err(err) => {
                tracing::warn!("Extrusion of {} aborted: {}", id, err);
                status.post(format!("Extrusion impossible : {err}"));
                return false;
            }
        };
        let Some(source) = scene.get(id) else {
            return false;
        };
        let (transform, layer) = (source.transform, source.layer);

        let preview = scene.add(
            SceneObject::mesh("Extrusion", Geometry::Mesh(mesh))
                .with_role(NodeRole::Preview)
                .with_transform(transform)
                .with_layer(layer),
        );
        scene.set_visible(id, false);
        self.regenerations += 1;
        self.throttle.reset();

        tracing::info!(
            "Extrusion session started on {} ({} profile)",
            id,
            profile.profile.kind().name()
        );
        self.session = Some(ExtrusionSession {
            source: id,
            profile,
            start_y: screen_y,
            height: self.config.min_height,
            preview,
            locked: false,
        });
        true
    }

    /// 根据指针的屏幕 y 更新预览；只有量化高度变化时才重新生成
    pub fn update_preview_at(&mut self, scene: &mut Scene, screen_y: f64, now: Instant) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        if session.locked {
            return false;
        }
        let height = self.quantize(screen_y - session.start_y);
        if (height - session.height).abs() <= HEIGHT_EPSILON {
            return false;
        }
        if !self.throttle.ready_at(now) {
            return false;
        }
        self.regenerate(scene, height)
    }

    /// 锁定：忽略指针移动
    pub fn lock(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.locked = true;
        }
    }

    pub fn unlock(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.locked = false;
        }
    }

    /// 输入精确高度并立即提交
    pub fn set_explicit_height(
        &mut self,
        scene: &mut Scene,
        height: f64,
        history: &mut HistoryLog,
        status: &mut dyn StatusSink,
    ) -> Option<ObjectId> {
        let current = self.session.as_ref()?.height;
        if !height.is_finite() {
            status.post("Hauteur invalide".to_string());
            return None;
        }
        self.lock();
        let height = height.max(self.config.min_height);
        if (height - current).abs() > HEIGHT_EPSILON {
            self.regenerate(scene, height);
        }
        self.commit(scene, history, status)
    }

    /// 按单击位置的高度提交，不受预览节流限制
    pub fn commit_at(
        &mut self,
        scene: &mut Scene,
        screen_y: f64,
        history: &mut HistoryLog,
        status: &mut dyn StatusSink,
    ) -> Option<ObjectId> {
        let session = self.session.as_ref()?;
        if !session.locked {
            let height = self.quantize(screen_y - session.start_y);
            if (height - session.height).abs() > HEIGHT_EPSILON {
                self.regenerate(scene, height);
            }
        }
        self.commit(scene, history, status)
    }

    /// 提交：移除源对象，预览成为正式对象，记录历史
    ///
    /// 预览已不在场景中时放弃提交，源对象恢复可见。
    pub fn commit(
        &mut self,
        scene: &mut Scene,
        history: &mut HistoryLog,
        status: &mut dyn StatusSink,
    ) -> Option<ObjectId> {
        let session = self.session.take()?;
        if !scene.contains(session.preview) {
            scene.set_visible(session.source, true);
            tracing::warn!(
                "Extrusion preview {} vanished, session on {} dropped",
                session.preview,
                session.source
            );
            status.post("Extrusion impossible : aperçu introuvable".to_string());
            return None;
        }

        scene.set_visible(session.source, true);
        let source = scene.remove_subtree(session.source);

        let solid = session.preview;
        if let Some(obj) = scene.get_mut(solid) {
            obj.role = NodeRole::Content;
        }
        scene.track(solid);
        let attrs = scene.attributes_mut().entry(solid);
        attrs.element = ElementClass::Extruded;
        attrs.extrusion = Some(ExtrusionInfo {
            height: session.height,
            profile_kind: session.profile.profile.kind(),
        });

        history.record(HistoryEntry::new(
            HistoryAction::Extrude,
            solid,
            HistoryPayload::Extrude {
                source_id: session.source,
                source,
                solid: None,
            },
        ));
        tracing::info!("Extrusion committed: {} -> {}", session.source, solid);
        status.post(format!("Extrusion terminée (hauteur: {:.1} cm)", session.height));
        Some(solid)
    }

    /// 取消：销毁预览并恢复源对象的可见性，不写历史
    pub fn cancel(&mut self, scene: &mut Scene, status: &mut dyn StatusSink) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        scene.remove_subtree(session.preview);
        scene.set_visible(session.source, true);
        tracing::info!("Extrusion session on {} cancelled", session.source);
        status.post("Extrusion annulée".to_string());
        true
    }

    fn regenerate(&mut self, scene: &mut Scene, height: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let mesh = match solid_mesh(&session.profile, height) {
            Ok(mesh) => mesh,
            Err(err) => {
                tracing::warn!("Extrusion preview regeneration failed: {}", err);
                return false;
            }
        };
        let Some(preview) = scene.get_mut(session.preview) else {
            return false;
        };
        // 旧网格随替换释放
        preview.geometry = Some(Geometry::Mesh(mesh));
        session.height = height;
        self.regenerations += 1;
        tracing::trace!("Extrusion preview height {:.1}", height);
        true
    }
}

/// 拉伸并抬升到轮廓所在高度
fn solid_mesh(profile: &PlanarProfile, height: f64) -> Result<MeshData, GeometryError> {
    let mut mesh = extrude_profile(&profile.profile, height)?;
    if profile.elevation != 0.0 {
        for p in &mut mesh.positions {
            p.z += profile.elevation;
        }
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusLine;
    use plancad_core::geometry::{Polyline, Profile};
    use plancad_core::math::{Point2, Point3};
    use std::time::Duration;

    fn rectangle(scene: &mut Scene) -> ObjectId {
        scene.add(SceneObject::mesh(
            "Rectangle",
            Geometry::Profile(Profile::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0))),
        ))
    }

    fn pipeline() -> ExtrusionPipeline {
        ExtrusionPipeline::new(ExtrusionConfig::default())
    }

    fn preview_height(scene: &Scene, pipeline: &ExtrusionPipeline) -> f64 {
        let id = pipeline.session().unwrap().preview();
        scene.get(id).unwrap().geometry.as_ref().unwrap().bounding_box().size().z
    }

    #[test]
    fn test_quantize() {
        let p = pipeline();
        assert!((p.quantize(0.0) - 0.1).abs() < 1e-9);
        assert!((p.quantize(1.0) - 0.1).abs() < 1e-9);
        assert!((p.quantize(-40.0) - 2.0).abs() < 1e-9);
        assert!((p.quantize(42.0) - 2.1).abs() < 1e-9);
    }

    #[test]
    fn test_same_quantized_height_does_not_regenerate() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut p = pipeline();
        let t0 = Instant::now();

        assert!(p.start_session(&mut scene, id, 100.0, &mut status));
        assert!(p.update_preview_at(&mut scene, 140.0, t0));
        let count = p.regenerations();

        // 40px 与 40.4px 量化为同一高度
        assert!(!p.update_preview_at(&mut scene, 140.4, t0 + Duration::from_millis(50)));
        assert_eq!(p.regenerations(), count);
        assert!((preview_height(&scene, &p) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_preview_throttled() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut p = pipeline();
        let t0 = Instant::now();

        p.start_session(&mut scene, id, 0.0, &mut status);
        assert!(p.update_preview_at(&mut scene, 20.0, t0));
        assert!(!p.update_preview_at(&mut scene, 60.0, t0 + Duration::from_millis(5)));
        assert!(p.update_preview_at(&mut scene, 60.0, t0 + Duration::from_millis(20)));
        assert!((p.height().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_second_session_rejected() {
        let mut scene = Scene::new();
        let a = rectangle(&mut scene);
        let b = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut p = pipeline();

        assert!(p.start_session(&mut scene, a, 0.0, &mut status));
        assert!(!p.start_session(&mut scene, b, 0.0, &mut status));
        assert_eq!(status.current(), Some("Une extrusion est déjà en cours"));
        assert_eq!(p.session().unwrap().source(), a);
        assert!(scene.get(b).unwrap().visible);
    }

    #[test]
    fn test_open_polyline_not_extrudable() {
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::line(
            "Line",
            Geometry::Polyline(Polyline::line(Point3::origin(), Point3::new(5.0, 0.0, 0.0))),
        ));
        let mut status = StatusLine::default();
        let mut p = pipeline();

        assert!(!p.can_extrude(&scene, id));
        assert!(!p.start_session(&mut scene, id, 0.0, &mut status));
        assert_eq!(status.current(), Some("Cet objet ne peut pas être extrudé"));
        assert!(!p.is_active());
        assert!(scene.get(id).unwrap().visible);
        assert_eq!(scene.count_role(NodeRole::Preview), 0);
    }

    #[test]
    fn test_degenerate_profile_aborts_session() {
        let mut scene = Scene::new();
        // 闭合但三点共线，面积为零
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
        ];
        let id = scene.add(SceneObject::line("Flat", Geometry::Polyline(Polyline::new(points, true))));
        let mut status = StatusLine::default();
        let mut p = pipeline();

        assert!(p.can_extrude(&scene, id));
        assert!(!p.start_session(&mut scene, id, 0.0, &mut status));
        assert!(status
            .current()
            .is_some_and(|m| m.starts_with("Extrusion impossible")));
        assert!(!p.is_active());
        assert!(scene.get(id).unwrap().visible);
        assert_eq!(scene.count_role(NodeRole::Preview), 0);
    }

    #[test]
    fn test_commit_uses_click_height() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut history = HistoryLog::default();
        let mut p = pipeline();
        let t0 = Instant::now();

        p.start_session(&mut scene, id, 0.0, &mut status);
        assert!(p.update_preview_at(&mut scene, 40.0, t0 + Duration::from_millis(1)));
        // 节流窗口内的移动被丢弃
        assert!(!p.update_preview_at(&mut scene, 60.0, t0 + Duration::from_millis(5)));
        assert!((p.height().unwrap() - 2.0).abs() < 1e-9);

        let solid = p.commit_at(&mut scene, 60.0, &mut history, &mut status).unwrap();
        let info = scene.attributes().get(solid).and_then(|a| a.extrusion).unwrap();
        assert!((info.height - 3.0).abs() < 1e-9);
        assert_eq!(status.current(), Some("Extrusion terminée (hauteur: 3.0 cm)"));
    }

    #[test]
    fn test_commit_without_preview_is_rejected() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut history = HistoryLog::default();
        let mut p = pipeline();

        p.start_session(&mut scene, id, 0.0, &mut status);
        let preview = p.session().unwrap().preview();
        scene.remove_subtree(preview);

        assert_eq!(p.commit(&mut scene, &mut history, &mut status), None);
        assert!(!p.is_active());
        assert!(history.is_empty());
        assert!(scene.attributes().get(preview).is_none());
        assert!(scene.contains(id));
        assert!(scene.get(id).unwrap().visible);
        assert_eq!(status.current(), Some("Extrusion impossible : aperçu introuvable"));
    }

    #[test]
    fn test_locked_ignores_pointer() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut p = pipeline();

        p.start_session(&mut scene, id, 0.0, &mut status);
        p.lock();
        assert!(!p.update_preview_at(&mut scene, 100.0, Instant::now()));
        assert!((p.height().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_height_commits() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut history = HistoryLog::default();
        let mut p = pipeline();

        p.start_session(&mut scene, id, 0.0, &mut status);
        let solid = p
            .set_explicit_height(&mut scene, 3.2, &mut history, &mut status)
            .unwrap();

        assert!(!p.is_active());
        assert!(!scene.contains(id));
        let info = scene.attributes().get(solid).and_then(|a| a.extrusion).unwrap();
        assert!((info.height - 3.2).abs() < 1e-9);
        assert_eq!(status.current(), Some("Extrusion terminée (hauteur: 3.2 cm)"));
        assert_eq!(history.last().map(|e| e.action), Some(HistoryAction::Extrude));
    }

    #[test]
    fn test_explicit_height_clamped() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut history = HistoryLog::default();
        let mut p = pipeline();

        p.start_session(&mut scene, id, 0.0, &mut status);
        let solid = p
            .set_explicit_height(&mut scene, -5.0, &mut history, &mut status)
            .unwrap();
        let height = scene.get(solid).unwrap().geometry.as_ref().unwrap().bounding_box().size().z;
        assert!((height - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_cancel_restores_source() {
        let mut scene = Scene::new();
        let id = rectangle(&mut scene);
        let mut status = StatusLine::default();
        let mut p = pipeline();

        p.start_session(&mut scene, id, 0.0, &mut status);
        assert!(!scene.get(id).unwrap().visible);

        assert!(p.cancel(&mut scene, &mut status));
        assert!(scene.get(id).unwrap().visible);
        assert_eq!(scene.count_role(NodeRole::Preview), 0);
        assert!(!p.cancel(&mut scene, &mut status));
    }

    #[test]
    fn test_closed_polyline_keeps_elevation() {
        let mut scene = Scene::new();
        let points = vec![
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(4.0, 0.0, 5.0),
            Point3::new(0.0, 3.0, 5.0),
        ];
        let id = scene.add(SceneObject::line("Tri", Geometry::Polyline(Polyline::new(points, true))));
        let mut status = StatusLine::default();
        let mut p = pipeline();

        assert!(p.start_session(&mut scene, id, 0.0, &mut status));
        let preview = p.session().unwrap().preview();
        let bbox = scene.get(preview).unwrap().geometry.as_ref().unwrap().bounding_box();
        assert!((bbox.min.z - 5.0).abs() < 1e-9);
    }
}
