//! 状态栏
//!
//! 交互核心只输出单行文本，不返回结构化错误。

use std::collections::VecDeque;

/// 状态消息接收方
pub trait StatusSink {
    fn post(&mut self, message: String);
}

/// 默认状态栏：当前消息 + 有界历史
#[derive(Debug, Clone)]
pub struct StatusLine {
    current: Option<String>,
    backlog: VecDeque<String>,
    capacity: usize,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(32)
    }
}

impl StatusLine {
    pub fn new(capacity: usize) -> Self {
        Self {
            current: None,
            backlog: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// 当前显示的消息
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// 历史消息（旧 -> 新）
    pub fn backlog(&self) -> impl Iterator<Item = &str> {
        self.backlog.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.backlog.clear();
    }
}

impl StatusSink for StatusLine {
    fn post(&mut self, message: String) {
        tracing::info!("{}", message);
        if self.backlog.len() == self.capacity {
            self.backlog.pop_front();
        }
        self.backlog.push_back(message.clone());
        self.current = Some(message);
    }
}
