//! 选择工具

use crate::action::{DoubleClickable, Tool, ToolContext, ToolOutcome};
use plancad_core::snap::ToolKind;

/// 单击选择命中对象，双击选择其顶层组
#[derive(Debug, Default)]
pub struct SelectTool;

impl SelectTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn name(&self) -> &'static str {
        "Sélection"
    }

    fn reset(&mut self) {}

    fn on_click(&mut self, ctx: &ToolContext) -> ToolOutcome {
        match ctx.hit {
            Some(target) => ToolOutcome::Select {
                target,
                additive: ctx.additive,
            },
            None if ctx.additive => ToolOutcome::Continue,
            None => ToolOutcome::ClearSelection,
        }
    }

    fn prompt(&self) -> &str {
        "Sélectionnez un objet"
    }

    fn as_double_clickable(&mut self) -> Option<&mut dyn DoubleClickable> {
        Some(self)
    }
}

impl DoubleClickable for SelectTool {
    fn on_double_click(&mut self, ctx: &ToolContext) -> ToolOutcome {
        match ctx.hit {
            Some(hit) => ToolOutcome::Select {
                target: ctx.scene.top_level(hit),
                additive: ctx.additive,
            },
            None => ToolOutcome::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancad_core::entity::ObjectId;
    use plancad_core::math::{Point2, Point3};
    use plancad_core::scene::{Scene, SceneObject};

    fn ctx(scene: &Scene, hit: Option<ObjectId>, additive: bool) -> ToolContext<'_> {
        ToolContext {
            scene,
            point: Point3::origin(),
            snap: None,
            pointer: Point2::origin(),
            hit,
            additive,
            extruding: false,
        }
    }

    #[test]
    fn test_click_empty_space() {
        let scene = Scene::new();
        let mut tool = SelectTool::new();
        assert!(matches!(tool.on_click(&ctx(&scene, None, false)), ToolOutcome::ClearSelection));
        assert!(matches!(tool.on_click(&ctx(&scene, None, true)), ToolOutcome::Continue));
    }

    #[test]
    fn test_double_click_selects_group() {
        let mut scene = Scene::new();
        let group = scene.add(SceneObject::group("Group"));
        let child = scene.add_child(group, SceneObject::group("Inner")).unwrap();
        let mut tool = SelectTool::new();

        let outcome = tool
            .as_double_clickable()
            .unwrap()
            .on_double_click(&ctx(&scene, Some(child), false));
        assert!(matches!(outcome, ToolOutcome::Select { target, .. } if target == group));
    }
}
