//! 对象的 CAD 属性
//!
//! 场景节点本身不携带任意键值对；选择标记、高亮还原记录、元素分类等
//! 以封闭的类型集合存放在按对象 ID 索引的侧表中。

use crate::entity::ObjectId;
use crate::geometry::ProfileKind;
use crate::scene::{Color, Material};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 元素分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementClass {
    /// 普通绘图元素
    #[default]
    Drawing,
    /// 拉伸生成的实体
    Extruded,
}

/// 拉伸结果信息
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionInfo {
    pub height: f64,
    pub profile_kind: ProfileKind,
}

/// 高亮策略种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    /// 直接修改线条颜色
    LineColor,
    /// 边缘轮廓叠加层
    EdgeOutline,
    /// 自发光材质替换
    EmissiveTint,
    /// 线框叠加层
    Wireframe,
    /// 略微放大的半透明副本
    InflatedShell,
}

/// 高亮还原记录：记录用了哪种策略，以便精确逆操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRecord {
    pub kind: HighlightKind,
    /// 叠加层节点（EdgeOutline / Wireframe / InflatedShell）
    pub overlay: Option<ObjectId>,
    /// 被替换前的材质（EmissiveTint）
    pub original_material: Option<Material>,
    /// 线条原始颜色（LineColor），选中期间的重新着色会更新它
    pub original_color: Option<Color>,
}

impl HighlightRecord {
    pub fn overlay(kind: HighlightKind, overlay: ObjectId) -> Self {
        Self {
            kind,
            overlay: Some(overlay),
            original_material: None,
            original_color: None,
        }
    }
}

/// 单个对象的 CAD 属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CadAttributes {
    pub selected: bool,
    /// 填充图案（不参与捕捉）
    pub hatch: bool,
    pub element: ElementClass,
    pub extrusion: Option<ExtrusionInfo>,
    pub highlight: Option<HighlightRecord>,
}

/// 属性侧表
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    entries: HashMap<ObjectId, CadAttributes>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&CadAttributes> {
        self.entries.get(&id)
    }

    /// 获取可变属性，不存在时以默认值创建
    pub fn entry(&mut self, id: ObjectId) -> &mut CadAttributes {
        self.entries.entry(id).or_default()
    }

    pub fn insert(&mut self, id: ObjectId, attrs: CadAttributes) {
        self.entries.insert(id, attrs);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<CadAttributes> {
        self.entries.remove(&id)
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.entries.get(&id).is_some_and(|a| a.selected)
    }

    pub fn is_hatch(&self, id: ObjectId) -> bool {
        self.entries.get(&id).is_some_and(|a| a.hatch)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
