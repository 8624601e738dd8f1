//! 选择集管理
//!
//! 选择集的成员是逻辑对象（组节点本身），高亮则作用在组的每个叶子上。
//! 属性表中的 `selected` 标志与成员关系始终一致。
//! 叶子只要仍被某个成员覆盖就保持高亮。

use crate::config::HighlightConfig;
use crate::highlight::{remove_highlight, HighlightChain, HighlightStrategy, LineColor};
use plancad_core::entity::ObjectId;
use plancad_core::scene::{Color, Scene};
use std::collections::HashSet;

/// 选择集与高亮管理器
pub struct SelectionManager {
    members: Vec<ObjectId>,
    chain: HighlightChain,
    config: HighlightConfig,
}

impl SelectionManager {
    pub fn new(config: HighlightConfig) -> Self {
        Self::with_chain(config, HighlightChain::default())
    }

    /// 使用自定义的高亮策略链
    pub fn with_chain(config: HighlightConfig, chain: HighlightChain) -> Self {
        Self {
            members: Vec::new(),
            chain,
            config,
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// 选中对象；非追加模式先清空其他成员
    ///
    /// 已选中的对象不会重复高亮，返回 false。
    pub fn select(&mut self, scene: &mut Scene, id: ObjectId, additive: bool) -> bool {
        if !scene.contains(id) {
            return false;
        }
        if !additive {
            let others: Vec<ObjectId> = self.members.iter().copied().filter(|m| *m != id).collect();
            for other in others {
                self.deselect(scene, other);
            }
        }
        if self.is_selected(id) {
            return false;
        }

        self.members.push(id);
        scene.attributes_mut().entry(id).selected = true;
        for leaf in scene.leaves(id) {
            self.highlight_leaf(scene, leaf);
        }
        tracing::debug!("Selected {} ({} members)", id, self.members.len());
        true
    }

    /// 取消选中并还原高亮
    pub fn deselect(&mut self, scene: &mut Scene, id: ObjectId) -> bool {
        let Some(index) = self.members.iter().position(|m| *m == id) else {
            return false;
        };
        self.members.remove(index);
        if scene.contains(id) {
            scene.attributes_mut().entry(id).selected = false;
            let covered = self.covered_leaves(scene);
            for leaf in scene.leaves(id) {
                if !covered.contains(&leaf) {
                    unhighlight_leaf(scene, leaf);
                }
            }
        }
        tracing::debug!("Deselected {}", id);
        true
    }

    /// 去掉对象所有叶子上的高亮，不改变成员关系
    ///
    /// 用于即将隐藏、移除或复制的对象：即使所在的组仍被选中也要还原。
    pub fn strip_highlight(&self, scene: &mut Scene, id: ObjectId) {
        for leaf in scene.leaves(id) {
            unhighlight_leaf(scene, leaf);
        }
    }

    /// 给成员覆盖但尚未高亮的叶子补上高亮
    pub fn refresh(&self, scene: &mut Scene) {
        for member in &self.members {
            for leaf in scene.leaves(*member) {
                self.highlight_leaf(scene, leaf);
            }
        }
    }

    pub fn clear(&mut self, scene: &mut Scene) {
        let members = self.members.clone();
        for id in members {
            self.deselect(scene, id);
        }
    }

    /// 切换选中状态，返回新的状态
    pub fn toggle(&mut self, scene: &mut Scene, id: ObjectId) -> bool {
        if self.is_selected(id) {
            self.deselect(scene, id);
            false
        } else {
            self.select(scene, id, true)
        }
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.members.contains(&id)
    }

    /// 选择集（按选中顺序）
    pub fn selected(&self) -> &[ObjectId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 修改线条颜色
    ///
    /// 线条处于高亮时只更新记住的原始颜色，取消选中后显示新颜色。
    pub fn recolor_line(&self, scene: &mut Scene, id: ObjectId, color: Color) -> bool {
        if !scene.get(id).is_some_and(|o| o.is_line()) {
            return false;
        }
        let attrs = scene.attributes_mut().entry(id);
        if let Some(record) = attrs.highlight.as_mut().filter(|r| r.original_color.is_some()) {
            record.original_color = Some(color);
            return true;
        }
        if let Some(obj) = scene.get_mut(id) {
            obj.material.color = color;
        }
        true
    }

    /// 移除已不在场景中的成员
    pub fn prune_missing(&mut self, scene: &Scene) {
        let before = self.members.len();
        self.members.retain(|id| scene.contains(*id));
        if self.members.len() != before {
            tracing::debug!("Pruned {} missing selection members", before - self.members.len());
        }
    }

    fn covered_leaves(&self, scene: &Scene) -> HashSet<ObjectId> {
        self.members.iter().flat_map(|m| scene.leaves(*m)).collect()
    }

    /// 隐藏的叶子和已有高亮的叶子跳过
    fn highlight_leaf(&self, scene: &mut Scene, leaf: ObjectId) {
        if !scene.is_effectively_visible(leaf)
            || scene
                .attributes()
                .get(leaf)
                .is_some_and(|a| a.highlight.is_some())
        {
            return;
        }
        let is_line = scene.get(leaf).is_some_and(|o| o.is_line());
        let record = if is_line {
            LineColor.apply(scene, leaf, &self.config).ok()
        } else {
            self.chain.apply(scene, leaf, &self.config)
        };
        if let Some(record) = record {
            scene.attributes_mut().entry(leaf).highlight = Some(record);
        }
    }
}

fn unhighlight_leaf(scene: &mut Scene, leaf: ObjectId) {
    let record = scene.attributes_mut().entry(leaf).highlight.take();
    if let Some(record) = record {
        remove_highlight(scene, leaf, &record);
    }
}
