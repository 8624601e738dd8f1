//! 拉伸工具

use crate::action::{RightClickable, Tool, ToolContext, ToolOutcome, ValueInput};
use plancad_core::snap::ToolKind;

/// 单击轮廓开始拉伸，移动指针调整高度，再次单击提交，右键取消
#[derive(Debug, Default)]
pub struct ExtrudeTool;

impl ExtrudeTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for ExtrudeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Extrude
    }

    fn name(&self) -> &'static str {
        "Extrusion"
    }

    fn reset(&mut self) {}

    fn on_pointer_move(&mut self, ctx: &ToolContext) -> ToolOutcome {
        if ctx.extruding {
            ToolOutcome::UpdateExtrusion {
                screen_y: ctx.pointer.y,
            }
        } else {
            ToolOutcome::Continue
        }
    }

    fn on_click(&mut self, ctx: &ToolContext) -> ToolOutcome {
        if ctx.extruding {
            return ToolOutcome::CommitExtrusion {
                screen_y: ctx.pointer.y,
            };
        }
        match ctx.hit {
            Some(object) => ToolOutcome::StartExtrusion {
                object,
                screen_y: ctx.pointer.y,
            },
            None => ToolOutcome::Message("Cliquez sur un profil à extruder".to_string()),
        }
    }

    fn prompt(&self) -> &str {
        "Cliquez sur un profil, déplacez la souris puis cliquez pour valider"
    }

    fn as_right_clickable(&mut self) -> Option<&mut dyn RightClickable> {
        Some(self)
    }

    fn as_value_input(&mut self) -> Option<&mut dyn ValueInput> {
        Some(self)
    }
}

impl RightClickable for ExtrudeTool {
    fn on_right_click(&mut self, ctx: &ToolContext) -> ToolOutcome {
        if ctx.extruding {
            ToolOutcome::CancelExtrusion
        } else {
            ToolOutcome::Continue
        }
    }
}

impl ValueInput for ExtrudeTool {
    fn on_value(&mut self, ctx: &ToolContext, value: f64) -> ToolOutcome {
        if ctx.extruding {
            ToolOutcome::ExplicitHeight(value)
        } else {
            ToolOutcome::Message("Aucune extrusion en cours".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancad_core::entity::ObjectId;
    use plancad_core::math::{Point2, Point3};
    use plancad_core::scene::Scene;

    fn ctx(scene: &Scene, hit: Option<ObjectId>, extruding: bool) -> ToolContext<'_> {
        ToolContext {
            scene,
            point: Point3::origin(),
            snap: None,
            pointer: Point2::new(200.0, 150.0),
            hit,
            additive: false,
            extruding,
        }
    }

    #[test]
    fn test_click_sequence() {
        let scene = Scene::new();
        let mut tool = ExtrudeTool::new();
        let id = ObjectId(3);

        assert!(matches!(
            tool.on_click(&ctx(&scene, Some(id), false)),
            ToolOutcome::StartExtrusion { object, screen_y } if object == id && screen_y == 150.0
        ));
        assert!(matches!(
            tool.on_pointer_move(&ctx(&scene, None, true)),
            ToolOutcome::UpdateExtrusion { .. }
        ));
        assert!(matches!(
            tool.on_click(&ctx(&scene, None, true)),
            ToolOutcome::CommitExtrusion { screen_y } if screen_y == 150.0
        ));
    }

    #[test]
    fn test_right_click_cancels() {
        let scene = Scene::new();
        let mut tool = ExtrudeTool::new();
        let outcome = tool
            .as_right_clickable()
            .unwrap()
            .on_right_click(&ctx(&scene, None, true));
        assert!(matches!(outcome, ToolOutcome::CancelExtrusion));
    }
}
