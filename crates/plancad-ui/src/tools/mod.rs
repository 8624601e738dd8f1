//! 交互工具实现

mod draw_polyline;
mod extrude;
mod select;

pub use draw_polyline::{DrawMode, DrawPolylineTool};
pub use extrude::ExtrudeTool;
pub use select::SelectTool;
