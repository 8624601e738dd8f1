//! 工具系统
//!
//! 每个工具是一个状态机，处理指针事件后返回 [`ToolOutcome`]，由编辑器执行。
//! 右键、双击、数值输入是可选能力，工具通过 `as_*` 方法显式声明。

use plancad_core::entity::ObjectId;
use plancad_core::math::{Point2, Point3};
use plancad_core::scene::{Scene, SceneObject};
use plancad_core::snap::{DrawingContext, SnapKind, ToolKind};
use std::time::Instant;

/// 指针事件
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    /// 射线与参考平面的交点（未捕捉）
    pub raw: Point3,
    /// 屏幕坐标（像素）
    pub screen: Point2,
    /// 射线命中的对象
    pub hit: Option<ObjectId>,
    /// 追加选择（Shift）
    pub additive: bool,
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(raw: Point3, screen: Point2) -> Self {
        Self {
            raw,
            screen,
            hit: None,
            additive: false,
            time: Instant::now(),
        }
    }

    pub fn with_hit(mut self, hit: ObjectId) -> Self {
        self.hit = Some(hit);
        self
    }

    pub fn additive(mut self) -> Self {
        self.additive = true;
        self
    }

    pub fn at(mut self, time: Instant) -> Self {
        self.time = time;
        self
    }
}

/// 工具上下文 - 传递给工具的运行时信息
pub struct ToolContext<'a> {
    pub scene: &'a Scene,
    /// 捕捉后的点
    pub point: Point3,
    pub snap: Option<SnapKind>,
    /// 指针屏幕坐标
    pub pointer: Point2,
    pub hit: Option<ObjectId>,
    pub additive: bool,
    /// 是否有进行中的拉伸会话
    pub extruding: bool,
}

/// 工具执行结果
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// 继续当前工具
    Continue,
    /// 创建对象
    Create(Vec<SceneObject>),
    Select { target: ObjectId, additive: bool },
    ClearSelection,
    StartExtrusion { object: ObjectId, screen_y: f64 },
    UpdateExtrusion { screen_y: f64 },
    /// 按单击位置的高度提交
    CommitExtrusion { screen_y: f64 },
    CancelExtrusion,
    /// 精确高度并提交
    ExplicitHeight(f64),
    /// 状态栏消息
    Message(String),
}

/// 工具 trait - 所有交互工具的核心接口
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str;

    /// 重置工具状态
    fn reset(&mut self);

    /// 提供给捕捉引擎的绘图上下文
    fn drawing_context(&self) -> DrawingContext {
        DrawingContext::idle()
    }

    fn on_pointer_move(&mut self, _ctx: &ToolContext) -> ToolOutcome {
        ToolOutcome::Continue
    }

    fn on_click(&mut self, ctx: &ToolContext) -> ToolOutcome;

    /// 当前状态的提示文本
    fn prompt(&self) -> &str;

    fn as_right_clickable(&mut self) -> Option<&mut dyn RightClickable> {
        None
    }

    fn as_double_clickable(&mut self) -> Option<&mut dyn DoubleClickable> {
        None
    }

    fn as_value_input(&mut self) -> Option<&mut dyn ValueInput> {
        None
    }
}

/// 响应右键
pub trait RightClickable {
    fn on_right_click(&mut self, ctx: &ToolContext) -> ToolOutcome;
}

/// 响应双击
pub trait DoubleClickable {
    fn on_double_click(&mut self, ctx: &ToolContext) -> ToolOutcome;
}

/// 接受键入的数值（长度、高度）
pub trait ValueInput {
    fn on_value(&mut self, ctx: &ToolContext, value: f64) -> ToolOutcome;
}
