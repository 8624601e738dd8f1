//! PlanCAD 交互层
//!
//! 把宿主的指针与键盘事件转换为场景操作：工具状态机、选择高亮、拉伸会话、
//! 撤销/重做，以及面向用户的状态栏消息。

pub mod action;
pub mod config;
pub mod editor;
pub mod error;
pub mod extrusion;
pub mod highlight;
pub mod selection;
pub mod status;
pub mod tools;

pub use action::{
    DoubleClickable, PointerEvent, RightClickable, Tool, ToolContext, ToolOutcome, ValueInput,
};
pub use config::{EditorConfig, ExtrusionConfig, HighlightConfig};
pub use editor::Editor;
pub use error::{ConfigError, HighlightError};
pub use extrusion::{ExtrusionPipeline, ExtrusionSession};
pub use highlight::{HighlightChain, HighlightStrategy};
pub use selection::SelectionManager;
pub use status::{StatusLine, StatusSink};
pub use tools::{DrawMode, DrawPolylineTool, ExtrudeTool, SelectTool};
