//! 编辑器
//!
//! 持有场景、相机、捕捉引擎、选择集、历史记录、拉伸流程、状态栏和当前工具，
//! 把宿主的指针/键盘事件分发给工具并执行工具返回的命令。

use crate::action::{PointerEvent, Tool, ToolContext, ToolOutcome};
use crate::config::EditorConfig;
use crate::extrusion::ExtrusionPipeline;
use crate::selection::SelectionManager;
use crate::status::{StatusLine, StatusSink};
use crate::tools::SelectTool;
use plancad_core::camera::Camera;
use plancad_core::entity::{LayerId, ObjectId};
use plancad_core::history::{HistoryAction, HistoryEntry, HistoryLog, HistoryPayload};
use plancad_core::math::{Point2, Point3, Vector2, Vector3};
use plancad_core::scene::{Color, ObjectSnapshot, Scene, SceneObject};
use plancad_core::snap::{SnapEngine, SnapResult, ToolKind};

/// 交互编辑器
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    camera: Camera,
    snap: SnapEngine,
    selection: SelectionManager,
    history: HistoryLog,
    extrusion: ExtrusionPipeline,
    status: StatusLine,
    tool: Box<dyn Tool>,
    /// 最近一次指针事件（数值输入时使用）
    last_pointer: Option<PointerEvent>,
    last_snap: Option<SnapResult>,
    /// 上次分发后工具是否有锚点，用于检测绘图会话结束
    had_anchor: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let camera = Camera::top_down(Point2::origin(), 10.0, Vector2::new(800.0, 600.0));
        tracing::info!("Editor initialized");
        Self {
            scene: Scene::new(),
            camera,
            snap: SnapEngine::new(config.snap.clone()),
            selection: SelectionManager::new(config.highlight.clone()),
            history: HistoryLog::new(config.history_capacity),
            extrusion: ExtrusionPipeline::new(config.extrusion.clone()),
            status: StatusLine::default(),
            tool: Box::new(SelectTool::new()),
            last_pointer: None,
            last_snap: None,
            had_anchor: false,
            config,
        }
    }

    /// 拆除：结束所有会话并清空场景
    pub fn teardown(&mut self) {
        self.extrusion.cancel(&mut self.scene, &mut self.status);
        self.selection.clear(&mut self.scene);
        self.snap.end_session(&mut self.scene);
        self.tool.reset();
        self.history.clear();
        self.scene.clear();
        self.last_pointer = None;
        self.last_snap = None;
        self.had_anchor = false;
        tracing::info!("Editor torn down");
    }

    // ---- 访问器 ----

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn snap(&self) -> &SnapEngine {
        &self.snap
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn extrusion(&self) -> &ExtrusionPipeline {
        &self.extrusion
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn tool(&self) -> &dyn Tool {
        self.tool.as_ref()
    }

    pub fn last_snap(&self) -> Option<SnapResult> {
        self.last_snap
    }

    // ---- 工具与输入 ----

    /// 切换工具；进行中的拉伸和绘图会话被取消
    pub fn set_tool(&mut self, tool: Box<dyn Tool>) {
        self.cancel_extrusion();
        self.tool.reset();
        self.snap.end_session(&mut self.scene);
        self.had_anchor = false;
        self.tool = tool;
        tracing::debug!("Tool switched to {}", self.tool.name());
        self.status.post(self.tool.prompt().to_string());
    }

    /// 指针移动：节流捕捉后交给工具
    pub fn pointer_move_at(&mut self, event: PointerEvent) -> SnapResult {
        let context = self.tool.drawing_context();
        let result = self.snap.resolve_throttled_at(
            &mut self.scene,
            &self.camera,
            event.raw,
            event.screen,
            &context,
            event.time,
        );
        self.last_snap = Some(result);
        self.last_pointer = Some(event);

        let outcome = {
            let ctx = tool_context(&self.scene, &event, result, self.extrusion.is_active());
            self.tool.on_pointer_move(&ctx)
        };
        self.execute(outcome, &event);
        result
    }

    /// 左键单击：总是使用最新的捕捉结果
    pub fn click(&mut self, event: PointerEvent) {
        let result = self.resolve_now(&event);
        let outcome = {
            let ctx = tool_context(&self.scene, &event, result, self.extrusion.is_active());
            self.tool.on_click(&ctx)
        };
        self.execute(outcome, &event);
        self.sync_drawing_session();
    }

    pub fn right_click(&mut self, event: PointerEvent) {
        let result = self.resolve_now(&event);
        let outcome = {
            let ctx = tool_context(&self.scene, &event, result, self.extrusion.is_active());
            self.tool
                .as_right_clickable()
                .map(|tool| tool.on_right_click(&ctx))
        };
        if let Some(outcome) = outcome {
            self.execute(outcome, &event);
        }
        self.sync_drawing_session();
    }

    pub fn double_click(&mut self, event: PointerEvent) {
        let result = self.resolve_now(&event);
        let outcome = {
            let ctx = tool_context(&self.scene, &event, result, self.extrusion.is_active());
            self.tool
                .as_double_clickable()
                .map(|tool| tool.on_double_click(&ctx))
        };
        if let Some(outcome) = outcome {
            self.execute(outcome, &event);
        }
        self.sync_drawing_session();
    }

    /// 键入数值（长度、高度）
    pub fn enter_value(&mut self, value: f64) -> bool {
        let event = self
            .last_pointer
            .unwrap_or_else(|| PointerEvent::new(Point3::origin(), Point2::origin()));
        let result = self.last_snap.unwrap_or_else(|| SnapResult::raw(event.raw));
        let outcome = {
            let ctx = tool_context(&self.scene, &event, result, self.extrusion.is_active());
            self.tool.as_value_input().map(|tool| tool.on_value(&ctx, value))
        };
        let accepted = outcome.is_some();
        match outcome {
            Some(outcome) => self.execute(outcome, &event),
            None => self.status.post("Saisie numérique non disponible".to_string()),
        }
        self.sync_drawing_session();
        accepted
    }

    /// Échap：取消拉伸或绘图；选择工具下清空选择
    pub fn escape(&mut self) {
        if self.cancel_extrusion() {
            return;
        }
        if self.tool.kind() == ToolKind::Select {
            self.selection.clear(&mut self.scene);
            self.status.post("Sélection annulée".to_string());
        } else {
            self.tool.reset();
            self.status.post("Annulé".to_string());
        }
        self.sync_drawing_session();
    }

    fn resolve_now(&mut self, event: &PointerEvent) -> SnapResult {
        let context = self.tool.drawing_context();
        let result = self.snap.resolve_at(
            &mut self.scene,
            &self.camera,
            event.raw,
            event.screen,
            &context,
            event.time,
        );
        self.last_snap = Some(result);
        self.last_pointer = Some(*event);
        result
    }

    /// 取消拉伸，源对象恢复可见后补回所在组的高亮
    fn cancel_extrusion(&mut self) -> bool {
        let cancelled = self.extrusion.cancel(&mut self.scene, &mut self.status);
        if cancelled {
            self.selection.refresh(&mut self.scene);
        }
        cancelled
    }

    /// 锚点消失即绘图会话结束，立即销毁辅助线
    fn sync_drawing_session(&mut self) {
        let has_anchor = self.tool.drawing_context().anchor().is_some();
        if self.had_anchor && !has_anchor {
            self.snap.end_session(&mut self.scene);
        }
        self.had_anchor = has_anchor;
    }

    fn execute(&mut self, outcome: ToolOutcome, event: &PointerEvent) {
        match outcome {
            ToolOutcome::Continue => {}
            ToolOutcome::Create(objects) => {
                for object in objects {
                    self.create_object(object);
                }
            }
            ToolOutcome::Select { target, additive } => {
                self.selection.select(&mut self.scene, target, additive);
            }
            ToolOutcome::ClearSelection => self.selection.clear(&mut self.scene),
            ToolOutcome::StartExtrusion { object, screen_y } => {
                if self
                    .extrusion
                    .start_session(&mut self.scene, object, screen_y, &mut self.status)
                {
                    // 隐藏的源对象不带高亮
                    self.selection.deselect(&mut self.scene, object);
                    self.selection.strip_highlight(&mut self.scene, object);
                }
            }
            ToolOutcome::UpdateExtrusion { screen_y } => {
                self.extrusion
                    .update_preview_at(&mut self.scene, screen_y, event.time);
            }
            ToolOutcome::CommitExtrusion { screen_y } => {
                self.extrusion.commit_at(
                    &mut self.scene,
                    screen_y,
                    &mut self.history,
                    &mut self.status,
                );
                self.selection.prune_missing(&self.scene);
                self.selection.refresh(&mut self.scene);
            }
            ToolOutcome::CancelExtrusion => {
                self.cancel_extrusion();
            }
            ToolOutcome::ExplicitHeight(height) => {
                self.extrusion.set_explicit_height(
                    &mut self.scene,
                    height,
                    &mut self.history,
                    &mut self.status,
                );
                self.selection.prune_missing(&self.scene);
                self.selection.refresh(&mut self.scene);
            }
            ToolOutcome::Message(message) => self.status.post(message),
        }
    }

    // ---- 结构性编辑 ----

    /// 添加对象并记录历史
    pub fn create_object(&mut self, object: SceneObject) -> ObjectId {
        let name = object.name.clone();
        let id = self.scene.add(object);
        self.history.record(HistoryEntry::new(
            HistoryAction::Create,
            id,
            HistoryPayload::Object { snapshot: None },
        ));
        self.status.post(format!("{name} créé"));
        id
    }

    pub fn delete(&mut self, id: ObjectId) -> bool {
        if self
            .extrusion
            .session()
            .is_some_and(|s| s.source() == id || s.preview() == id)
        {
            self.status.post("Une extrusion est en cours sur cet objet".to_string());
            return false;
        }
        let Some(snapshot) = detach(&mut self.scene, &mut self.selection, id) else {
            self.status.post("Objet introuvable".to_string());
            return false;
        };
        self.history.record(HistoryEntry::new(
            HistoryAction::Delete,
            id,
            HistoryPayload::Object {
                snapshot: Some(snapshot),
            },
        ));
        self.status.post("Objet supprimé".to_string());
        true
    }

    /// 删除选择集中的所有对象，返回删除数量
    pub fn delete_selected(&mut self) -> usize {
        let members = self.selection.selected().to_vec();
        members.into_iter().filter(|id| self.delete(*id)).count()
    }

    pub fn move_to_layer(&mut self, id: ObjectId, layer: LayerId) -> bool {
        let Some(from) = self.scene.move_to_layer(id, layer) else {
            self.status.post("Calque ou objet introuvable".to_string());
            return false;
        };
        if from == layer {
            return false;
        }
        self.history.record(HistoryEntry::new(
            HistoryAction::MoveLayer,
            id,
            HistoryPayload::Layer { from, to: layer },
        ));
        let name = self
            .scene
            .layer(layer)
            .map(|l| l.name.clone())
            .unwrap_or_default();
        self.status.post(format!("Objet déplacé vers le calque {name}"));
        true
    }

    /// 复制对象；原对象已选中时选择转移到副本
    pub fn duplicate(&mut self, id: ObjectId, offset: Vector3) -> Option<ObjectId> {
        // 先还原高亮，副本才不会带上高亮材质
        let was_selected = self.selection.deselect(&mut self.scene, id);
        self.selection.strip_highlight(&mut self.scene, id);
        let copy = self.scene.duplicate(id, offset);
        self.selection.refresh(&mut self.scene);
        let Some(copy) = copy else {
            self.status.post("Objet introuvable".to_string());
            return None;
        };
        if was_selected {
            self.selection.select(&mut self.scene, copy, true);
        }
        self.history.record(HistoryEntry::new(
            HistoryAction::Duplicate,
            copy,
            HistoryPayload::Object { snapshot: None },
        ));
        self.status.post("Objet dupliqué".to_string());
        Some(copy)
    }

    /// 修改线条颜色（选中期间同样生效）
    pub fn set_line_color(&mut self, id: ObjectId, color: Color) -> bool {
        self.selection.recolor_line(&mut self.scene, id, color)
    }

    // ---- 历史 ----

    pub fn undo(&mut self) -> bool {
        self.cancel_extrusion();
        let Some(entry) = self.history.undo() else {
            self.status.post("Rien à annuler".to_string());
            return false;
        };
        let name = entry.action.name();
        tracing::debug!("Undo {:?} {}", entry.action, entry.object_id);
        apply_inverse(&mut self.scene, &mut self.selection, entry);
        self.selection.prune_missing(&self.scene);
        self.selection.refresh(&mut self.scene);
        self.status.post(format!("Annulé : {name}"));
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_extrusion();
        let Some(entry) = self.history.redo() else {
            self.status.post("Rien à rétablir".to_string());
            return false;
        };
        let name = entry.action.name();
        tracing::debug!("Redo {:?} {}", entry.action, entry.object_id);
        apply_forward(&mut self.scene, &mut self.selection, entry);
        self.selection.prune_missing(&self.scene);
        self.selection.refresh(&mut self.scene);
        self.status.post(format!("Rétabli : {name}"));
        true
    }
}

fn tool_context<'a>(
    scene: &'a Scene,
    event: &PointerEvent,
    snap: SnapResult,
    extruding: bool,
) -> ToolContext<'a> {
    ToolContext {
        scene,
        point: snap.point,
        snap: snap.kind,
        pointer: event.screen,
        hit: event.hit,
        additive: event.additive,
        extruding,
    }
}

/// 取消选中后移除对象子树
fn detach(scene: &mut Scene, selection: &mut SelectionManager, id: ObjectId) -> Option<ObjectSnapshot> {
    if !scene.contains(id) {
        return None;
    }
    let subtree: Vec<ObjectId> = std::iter::once(id).chain(scene.descendants(id)).collect();
    for node in subtree {
        selection.deselect(scene, node);
    }
    selection.strip_highlight(scene, id);
    scene.remove_subtree(id)
}

fn restore(scene: &mut Scene, snapshot: &mut Option<ObjectSnapshot>) {
    if let Some(snapshot) = snapshot.take() {
        if scene.restore(&snapshot).is_none() {
            tracing::warn!("Snapshot root already present, restore skipped");
        }
    }
}

/// 撤销：应用条目的逆操作，移除的对象存入条目
fn apply_inverse(scene: &mut Scene, selection: &mut SelectionManager, entry: &mut HistoryEntry) {
    let id = entry.object_id;
    match (entry.action, &mut entry.payload) {
        (HistoryAction::Create | HistoryAction::Duplicate, HistoryPayload::Object { snapshot }) => {
            *snapshot = detach(scene, selection, id);
        }
        (HistoryAction::Delete, HistoryPayload::Object { snapshot }) => restore(scene, snapshot),
        (HistoryAction::Extrude, HistoryPayload::Extrude { source, solid, .. }) => {
            *solid = detach(scene, selection, id);
            restore(scene, source);
        }
        (HistoryAction::MoveLayer, HistoryPayload::Layer { from, .. }) => {
            scene.move_to_layer(id, *from);
        }
        (action, _) => tracing::warn!("History entry {:?} has a mismatched payload", action),
    }
}

/// 重做：重新应用条目的正向操作
fn apply_forward(scene: &mut Scene, selection: &mut SelectionManager, entry: &mut HistoryEntry) {
    let id = entry.object_id;
    match (entry.action, &mut entry.payload) {
        (HistoryAction::Create | HistoryAction::Duplicate, HistoryPayload::Object { snapshot }) => {
            restore(scene, snapshot)
        }
        (HistoryAction::Delete, HistoryPayload::Object { snapshot }) => {
            *snapshot = detach(scene, selection, id);
        }
        (
            HistoryAction::Extrude,
            HistoryPayload::Extrude {
                source_id,
                source,
                solid,
            },
        ) => {
            *source = detach(scene, selection, *source_id);
            restore(scene, solid);
        }
        (HistoryAction::MoveLayer, HistoryPayload::Layer { to, .. }) => {
            scene.move_to_layer(id, *to);
        }
        (action, _) => tracing::warn!("History entry {:?} has a mismatched payload", action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{DrawPolylineTool, ExtrudeTool};
    use plancad_core::geometry::{Geometry, Polyline, Profile};
    use plancad_core::scene::NodeRole;

    fn line(a: (f64, f64), b: (f64, f64)) -> SceneObject {
        SceneObject::line(
            "Ligne",
            Geometry::Polyline(Polyline::line(
                Point3::new(a.0, a.1, 0.0),
                Point3::new(b.0, b.1, 0.0),
            )),
        )
    }

    /// 世界坐标 -> 指针事件（10 像素 = 1 单位，原点在屏幕中心）
    fn at(editor: &Editor, x: f64, y: f64) -> PointerEvent {
        let raw = Point3::new(x, y, 0.0);
        let screen = editor.camera().project(&raw).unwrap_or_else(Point2::origin);
        PointerEvent::new(raw, screen)
    }

    #[test]
    fn test_undo_redo_create() {
        let mut editor = Editor::default();
        let id = editor.create_object(line((0.0, 0.0), (5.0, 0.0)));

        assert!(editor.undo());
        assert!(!editor.scene().contains(id));
        assert!(!editor.scene().is_tracked(id));
        assert_eq!(editor.status().current(), Some("Annulé : Création"));

        assert!(editor.redo());
        assert!(editor.scene().contains(id));
        assert!(editor.scene().is_tracked(id));
        assert!(!editor.redo());
        assert_eq!(editor.status().current(), Some("Rien à rétablir"));
    }

    #[test]
    fn test_undo_empty_history() {
        let mut editor = Editor::default();
        assert!(!editor.undo());
        assert_eq!(editor.status().current(), Some("Rien à annuler"));
    }

    #[test]
    fn test_undo_create_deselects() {
        let mut editor = Editor::default();
        let id = editor.create_object(line((0.0, 0.0), (5.0, 0.0)));
        editor.click(at(&editor, 2.0, 0.0).with_hit(id));
        assert!(editor.selection().is_selected(id));

        editor.undo();
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_delete_undo_restores() {
        let mut editor = Editor::default();
        let id = editor.create_object(line((0.0, 0.0), (5.0, 0.0)));
        editor.click(at(&editor, 2.0, 0.0).with_hit(id));

        assert_eq!(editor.delete_selected(), 1);
        assert!(!editor.scene().contains(id));
        assert!(editor.selection().is_empty());

        editor.undo();
        let restored = editor.scene().get(id).unwrap();
        assert_eq!(restored.material.color, Color::BLACK);
        assert!(!editor.scene().attributes().is_selected(id));

        editor.redo();
        assert!(!editor.scene().contains(id));
    }

    #[test]
    fn test_move_layer_history() {
        let mut editor = Editor::default();
        let id = editor.create_object(line((0.0, 0.0), (5.0, 0.0)));
        let walls = editor.scene_mut().add_layer("Murs");

        assert!(editor.move_to_layer(id, walls));
        assert_eq!(editor.scene().get(id).unwrap().layer, walls);

        editor.undo();
        assert_eq!(editor.scene().get(id).unwrap().layer, LayerId::DEFAULT);
        editor.redo();
        assert_eq!(editor.scene().get(id).unwrap().layer, walls);
    }

    #[test]
    fn test_duplicate_moves_selection() {
        let mut editor = Editor::default();
        let id = editor.create_object(line((0.0, 0.0), (5.0, 0.0)));
        editor.click(at(&editor, 2.0, 0.0).with_hit(id));

        let copy = editor.duplicate(id, Vector3::new(0.0, 3.0, 0.0)).unwrap();
        assert_eq!(editor.selection().selected(), &[copy]);
        assert_eq!(editor.scene().get(id).unwrap().material.color, Color::BLACK);

        editor.undo();
        assert!(!editor.scene().contains(copy));
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_draw_line_records_create() {
        let mut editor = Editor::default();
        editor.set_tool(Box::new(DrawPolylineTool::line()));

        editor.click(at(&editor, 0.0, 0.0));
        editor.click(at(&editor, 8.0, 0.0));

        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.history().last().map(|e| e.action), Some(HistoryAction::Create));
        assert_eq!(editor.scene().count_role(NodeRole::Content), 1);
    }

    #[test]
    fn test_extrude_undo_redo() {
        let mut editor = Editor::default();
        let rect = editor.create_object(SceneObject::mesh(
            "Rectangle",
            Geometry::Profile(Profile::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0))),
        ));
        editor.set_tool(Box::new(ExtrudeTool::new()));

        editor.click(at(&editor, 5.0, 5.0).with_hit(rect));
        assert!(editor.extrusion().is_active());
        assert!(editor.enter_value(2.5));
        assert!(!editor.extrusion().is_active());
        let solid = editor.history().last().map(|e| e.object_id).unwrap();

        editor.undo();
        assert!(editor.scene().contains(rect));
        assert!(editor.scene().get(rect).unwrap().visible);
        assert!(!editor.scene().contains(solid));

        editor.redo();
        assert!(!editor.scene().contains(rect));
        assert!(editor.scene().contains(solid));
        assert!(editor.scene().is_tracked(solid));
    }

    #[test]
    fn test_extruding_leaf_of_selected_group() {
        let mut editor = Editor::default();
        let group = editor.scene_mut().add(SceneObject::group("Groupe"));
        let leaf = editor
            .scene_mut()
            .add_child(
                group,
                SceneObject::mesh(
                    "Rectangle",
                    Geometry::Profile(Profile::rectangle(
                        Point2::new(0.0, 0.0),
                        Point2::new(10.0, 10.0),
                    )),
                ),
            )
            .unwrap();
        let highlighted = |editor: &Editor| {
            editor
                .scene()
                .attributes()
                .get(leaf)
                .is_some_and(|a| a.highlight.is_some())
        };

        editor.click(at(&editor, 5.0, 5.0).with_hit(group));
        assert!(editor.selection().is_selected(group));
        assert!(highlighted(&editor));

        editor.set_tool(Box::new(ExtrudeTool::new()));
        editor.click(at(&editor, 5.0, 5.0).with_hit(leaf));
        assert!(editor.extrusion().is_active());
        assert!(!highlighted(&editor));
        assert_eq!(editor.scene().count_role(NodeRole::Overlay), 0);

        // 取消后源对象重新显示，组仍选中，高亮恢复
        editor.right_click(at(&editor, 5.0, 5.0));
        assert!(highlighted(&editor));
        assert_eq!(editor.scene().count_role(NodeRole::Overlay), 1);

        editor.click(at(&editor, 5.0, 5.0).with_hit(leaf));
        editor.click(at(&editor, 5.0, 9.0));
        assert!(!editor.extrusion().is_active());
        match &editor.history().last().unwrap().payload {
            HistoryPayload::Extrude {
                source: Some(snapshot),
                ..
            } => {
                assert!(snapshot.nodes.iter().all(|n| n.role != NodeRole::Overlay));
                assert!(snapshot.attributes.iter().all(|(_, a)| a.highlight.is_none()));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert!(editor.selection().is_selected(group));
        assert_eq!(editor.scene().count_role(NodeRole::Overlay), 0);
    }

    #[test]
    fn test_escape_clears_selection() {
        let mut editor = Editor::default();
        let id = editor.create_object(line((0.0, 0.0), (5.0, 0.0)));
        editor.click(at(&editor, 2.0, 0.0).with_hit(id));

        editor.escape();
        assert!(editor.selection().is_empty());
        assert_eq!(editor.scene().get(id).unwrap().material.color, Color::BLACK);
    }

    #[test]
    fn test_teardown_empties_everything() {
        let mut editor = Editor::default();
        editor.create_object(line((0.0, 0.0), (5.0, 0.0)));
        editor.teardown();

        assert!(editor.scene().is_empty());
        assert!(editor.history().is_empty());
        assert!(editor.selection().is_empty());
    }
}
