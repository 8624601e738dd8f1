//! 历史记录
//!
//! 线性撤销/重做日志：有界（默认 50 条），游标指向最后一条已应用的记录，
//! `-1` 表示没有可撤销的记录。游标不在末尾时记录新操作会丢弃其后的全部记录。

use crate::entity::{LayerId, ObjectId};
use crate::scene::ObjectSnapshot;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// 默认容量
pub const DEFAULT_CAPACITY: usize = 50;

/// 结构性操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryAction {
    Create,
    Delete,
    Extrude,
    MoveLayer,
    Duplicate,
}

impl HistoryAction {
    pub fn name(&self) -> &'static str {
        match self {
            HistoryAction::Create => "Création",
            HistoryAction::Delete => "Suppression",
            HistoryAction::Extrude => "Extrusion",
            HistoryAction::MoveLayer => "Changement de calque",
            HistoryAction::Duplicate => "Duplication",
        }
    }
}

/// 正向/逆向应用所需的数据
///
/// 快照字段只在对应对象不在场景中时有值，撤销/重做时与场景交换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryPayload {
    /// Create / Delete / Duplicate
    Object { snapshot: Option<ObjectSnapshot> },
    /// 拉伸：源轮廓与生成的实体（实体 ID 即条目的 `object_id`）
    Extrude {
        source_id: ObjectId,
        source: Option<ObjectSnapshot>,
        solid: Option<ObjectSnapshot>,
    },
    /// 图层移动
    Layer { from: LayerId, to: LayerId },
}

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub object_id: ObjectId,
    /// 记录时间（UNIX 毫秒）
    pub timestamp: u64,
    pub payload: HistoryPayload,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, object_id: ObjectId, payload: HistoryPayload) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            action,
            object_id,
            timestamp,
            payload,
        }
    }
}

/// 有界线性历史
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    cursor: i32,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            cursor: -1,
            capacity: capacity.max(1),
        }
    }

    /// 记录新操作
    pub fn record(&mut self, entry: HistoryEntry) {
        // 截断 redo 历史
        let new_len = (self.cursor + 1) as usize;
        if new_len < self.entries.len() {
            tracing::debug!(
                "History: discarding {} redo entries",
                self.entries.len() - new_len
            );
            self.entries.truncate(new_len);
        }

        tracing::debug!("History record {:?} {}", entry.action, entry.object_id);
        self.entries.push(entry);
        self.cursor = self.entries.len() as i32 - 1;

        if self.entries.len() > self.capacity {
            let evicted = self.entries.remove(0);
            self.cursor -= 1;
            tracing::debug!("History evicted {:?} {}", evicted.action, evicted.object_id);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        (self.cursor + 1) < self.entries.len() as i32
    }

    /// 取出游标处的记录并后退游标；调用方负责应用逆操作
    pub fn undo(&mut self) -> Option<&mut HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        let index = self.cursor as usize;
        self.cursor -= 1;
        self.entries.get_mut(index)
    }

    /// 前进游标并取出该记录；调用方负责重新应用
    pub fn redo(&mut self) -> Option<&mut HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get_mut(self.cursor as usize)
    }

    pub fn cursor(&self) -> i32 {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}
