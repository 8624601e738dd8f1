//! 场景注册表
//!
//! `Scene` 显式持有所有场景节点、可拾取对象集合、图层和 CAD 属性侧表。
//! 交互核心的各个组件通过引用访问它，由宿主负责创建和 [`Scene::clear`]。

use crate::attributes::{AttributeTable, CadAttributes};
use crate::entity::{LayerId, ObjectId};
use crate::geometry::{Arc, Feature, Geometry, Segment};
use crate::math::{BoundingBox3, Point3, Vector3};
use nalgebra::{Matrix4, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// RGB 颜色（0.0 - 1.0）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// 从 0xRRGGBB 创建
    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
        )
    }

    pub fn to_hex(&self) -> u32 {
        let c = |v: f32| ((v.clamp(0.0, 1.0) * 255.0).round() as u32) & 0xFF;
        (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// 材质类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    /// 受光照材质（有自发光通道）
    #[default]
    Standard,
    /// 不受光照的纯色材质（线条、辅助线）
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub emissive: Color,
    pub opacity: f32,
    pub wireframe: bool,
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self {
            kind: MaterialKind::Standard,
            color,
            emissive: Color::BLACK,
            opacity: 1.0,
            wireframe: false,
        }
    }

    pub fn basic(color: Color) -> Self {
        Self {
            kind: MaterialKind::Basic,
            ..Self::standard(color)
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(Color::WHITE)
    }
}

/// 节点变换：缩放 -> 旋转 -> 平移
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_translation(translation: Vector3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub fn apply(&self, p: &Point3) -> Point3 {
        Point3::from(self.translation + self.rotation * p.coords.component_mul(&self.scale))
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Line,
    Mesh,
    Group,
}

/// 节点在场景中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeRole {
    /// 用户内容
    #[default]
    Content,
    /// 捕捉辅助线
    Guide,
    /// 高亮叠加层
    Overlay,
    /// 拉伸预览
    Preview,
}

/// 场景节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    pub role: NodeRole,
    pub geometry: Option<Geometry>,
    pub transform: Transform,
    pub visible: bool,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub layer: LayerId,
    pub material: Material,
}

impl SceneObject {
    /// 创建节点（ID 由 [`Scene::add`] 分配）
    pub fn new(name: impl Into<String>, kind: ObjectKind, geometry: Option<Geometry>) -> Self {
        let material = match kind {
            ObjectKind::Line => Material::basic(Color::BLACK),
            _ => Material::default(),
        };
        Self {
            id: ObjectId(0),
            name: name.into(),
            kind,
            role: NodeRole::Content,
            geometry,
            transform: Transform::identity(),
            visible: true,
            parent: None,
            children: Vec::new(),
            layer: LayerId::DEFAULT,
            material,
        }
    }

    pub fn line(name: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(name, ObjectKind::Line, Some(geometry))
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(name, ObjectKind::Mesh, Some(geometry))
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, ObjectKind::Group, None)
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    pub fn is_line(&self) -> bool {
        self.kind == ObjectKind::Line
    }

    pub fn is_group(&self) -> bool {
        self.kind == ObjectKind::Group
    }
}

/// 图层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
}

/// 被移除子树的完整快照，用于撤销/重做
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    /// 根节点在前，其余按先序排列
    pub nodes: Vec<SceneObject>,
    pub attributes: Vec<(ObjectId, CadAttributes)>,
    pub tracked: Vec<ObjectId>,
    /// 根节点在父节点子列表中的位置
    pub sibling_index: Option<usize>,
}

impl ObjectSnapshot {
    pub fn root(&self) -> Option<ObjectId> {
        self.nodes.first().map(|n| n.id)
    }
}

/// 场景注册表
#[derive(Debug, Clone)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
    tracked: BTreeSet<ObjectId>,
    layers: BTreeMap<LayerId, Layer>,
    attributes: AttributeTable,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(
            LayerId::DEFAULT,
            Layer {
                id: LayerId::DEFAULT,
                name: "0".to_string(),
                visible: true,
            },
        );
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            tracked: BTreeSet::new(),
            layers,
            attributes: AttributeTable::new(),
        }
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 添加根节点；内容节点自动加入可拾取集合
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        let id = self.allocate_id();
        object.id = id;
        object.parent = None;
        if object.role == NodeRole::Content {
            self.tracked.insert(id);
            self.attributes.entry(id);
        }
        tracing::trace!("Scene add {} ({})", id, object.name);
        self.objects.insert(id, object);
        id
    }

    /// 添加子节点；父节点不存在时返回 None
    pub fn add_child(&mut self, parent: ObjectId, mut object: SceneObject) -> Option<ObjectId> {
        if !self.objects.contains_key(&parent) {
            return None;
        }
        let id = self.allocate_id();
        object.id = id;
        object.parent = Some(parent);
        if object.role == NodeRole::Content {
            self.attributes.entry(id);
        }
        self.objects.insert(id, object);
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// 指定角色的节点数量
    pub fn count_role(&self, role: NodeRole) -> usize {
        self.objects.values().filter(|o| o.role == role).count()
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.attributes
    }

    // ---- 可拾取集合 ----

    pub fn track(&mut self, id: ObjectId) {
        if self.objects.contains_key(&id) {
            self.tracked.insert(id);
        }
    }

    pub fn untrack(&mut self, id: ObjectId) {
        self.tracked.remove(&id);
    }

    pub fn is_tracked(&self, id: ObjectId) -> bool {
        self.tracked.contains(&id)
    }

    pub fn tracked(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.tracked.iter().copied()
    }

    // ---- 图层 ----

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId(self.layers.keys().map(|l| l.0 + 1).max().unwrap_or(0));
        self.layers.insert(
            id,
            Layer {
                id,
                name: name.into(),
                visible: true,
            },
        );
        id
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// 把对象（含子树）移动到图层，返回原图层
    pub fn move_to_layer(&mut self, id: ObjectId, layer: LayerId) -> Option<LayerId> {
        if !self.layers.contains_key(&layer) {
            return None;
        }
        let previous = self.objects.get(&id)?.layer;
        for node in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(obj) = self.objects.get_mut(&node) {
                obj.layer = layer;
            }
        }
        Some(previous)
    }

    // ---- 层级 ----

    /// 所有后代（先序，不含自身）
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack: Vec<ObjectId> = match self.objects.get(&id) {
            Some(obj) => obj.children.iter().rev().copied().collect(),
            None => return result,
        };
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(obj) = self.objects.get(&current) {
                stack.extend(obj.children.iter().rev().copied());
            }
        }
        result
    }

    /// 可高亮的叶子节点（线条或网格内容节点）
    pub fn leaves(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(obj) = self.objects.get(&id) else {
            return Vec::new();
        };
        if !obj.is_group() {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|d| {
                self.objects
                    .get(d)
                    .is_some_and(|o| !o.is_group() && o.role == NodeRole::Content)
            })
            .collect()
    }

    /// 最顶层的祖先
    pub fn top_level(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        while let Some(parent) = self.objects.get(&current).and_then(|o| o.parent) {
            current = parent;
        }
        current
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.visible = visible;
                true
            }
            None => false,
        }
    }

    /// 节点及所有祖先都可见
    pub fn is_effectively_visible(&self, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.objects.get(&node) {
                Some(obj) if obj.visible && self.layers.get(&obj.layer).is_none_or(|l| l.visible) => {
                    current = obj.parent;
                }
                _ => return false,
            }
        }
        true
    }

    // ---- 世界坐标 ----

    pub fn world_matrix(&self, id: ObjectId) -> Matrix4<f64> {
        let mut matrix = Matrix4::identity();
        let mut current = self.objects.get(&id);
        while let Some(obj) = current {
            matrix = obj.transform.to_matrix() * matrix;
            current = obj.parent.and_then(|p| self.objects.get(&p));
        }
        matrix
    }

    /// 世界坐标下的顶点
    pub fn world_points(&self, id: ObjectId) -> Vec<Point3> {
        let Some(geometry) = self.objects.get(&id).and_then(|o| o.geometry.as_ref()) else {
            return Vec::new();
        };
        let m = self.world_matrix(id);
        geometry.vertices().iter().map(|p| m.transform_point(p)).collect()
    }

    /// 世界坐标下的捕捉特征
    pub fn world_features(&self, id: ObjectId) -> Vec<Feature> {
        let Some(geometry) = self.objects.get(&id).and_then(|o| o.geometry.as_ref()) else {
            return Vec::new();
        };
        let m = self.world_matrix(id);
        geometry
            .features()
            .into_iter()
            .map(|f| match f {
                Feature::Straight(s) => Feature::Straight(Segment::new(
                    m.transform_point(&s.start),
                    m.transform_point(&s.end),
                )),
                Feature::Curved(a) => Feature::Curved(transform_arc(&m, &a)),
            })
            .collect()
    }

    /// 世界坐标包围盒（含子树）
    pub fn world_bounding_box(&self, id: ObjectId) -> BoundingBox3 {
        let mut bbox = BoundingBox3::empty();
        for node in std::iter::once(id).chain(self.descendants(id)) {
            for p in self.world_points(node) {
                bbox.expand_to_include(&p);
            }
        }
        bbox
    }

    /// 可作为捕捉目标的对象：可见的内容节点，有几何，非填充
    pub fn snap_targets(&self) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| {
                o.role == NodeRole::Content
                    && o.geometry.is_some()
                    && !self.attributes.is_hatch(o.id)
                    && self.is_effectively_visible(o.id)
            })
            .map(|o| o.id)
            .collect()
    }

    // ---- 移除 / 恢复 ----

    /// 移除对象及其子树，返回可用于恢复的快照
    pub fn remove_subtree(&mut self, id: ObjectId) -> Option<ObjectSnapshot> {
        if !self.objects.contains_key(&id) {
            return None;
        }
        let order: Vec<ObjectId> = std::iter::once(id).chain(self.descendants(id)).collect();

        let mut sibling_index = None;
        if let Some(parent) = self.objects.get(&id).and_then(|o| o.parent) {
            if let Some(p) = self.objects.get_mut(&parent) {
                sibling_index = p.children.iter().position(|c| *c == id);
                p.children.retain(|c| *c != id);
            }
        }

        let mut snapshot = ObjectSnapshot {
            nodes: Vec::with_capacity(order.len()),
            attributes: Vec::new(),
            tracked: Vec::new(),
            sibling_index,
        };
        for node in order {
            if let Some(obj) = self.objects.remove(&node) {
                snapshot.nodes.push(obj);
            }
            if let Some(attrs) = self.attributes.remove(node) {
                snapshot.attributes.push((node, attrs));
            }
            if self.tracked.remove(&node) {
                snapshot.tracked.push(node);
            }
        }
        tracing::trace!("Scene remove {} ({} nodes)", id, snapshot.nodes.len());
        Some(snapshot)
    }

    /// 从快照恢复子树（保留原 ID）
    pub fn restore(&mut self, snapshot: &ObjectSnapshot) -> Option<ObjectId> {
        let root = snapshot.root()?;
        if self.objects.contains_key(&root) {
            return None;
        }
        for node in &snapshot.nodes {
            self.next_id = self.next_id.max(node.id.0 + 1);
            self.objects.insert(node.id, node.clone());
        }
        for (id, attrs) in &snapshot.attributes {
            self.attributes.insert(*id, attrs.clone());
        }
        self.tracked.extend(snapshot.tracked.iter().copied());

        let parent = snapshot.nodes.first().and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.objects.get_mut(&p)) {
            let index = snapshot.sibling_index.unwrap_or(p.children.len()).min(p.children.len());
            p.children.insert(index, root);
        }
        Some(root)
    }

    /// 深拷贝对象子树并平移，返回新根节点
    ///
    /// 副本不继承选中状态和高亮记录。
    pub fn duplicate(&mut self, id: ObjectId, offset: Vector3) -> Option<ObjectId> {
        let source = self.objects.get(&id)?.clone();
        let copy_id = self.duplicate_node(&source, source.parent, offset)?;
        if source.parent.is_none() && self.tracked.contains(&id) {
            self.tracked.insert(copy_id);
        }
        Some(copy_id)
    }

    fn duplicate_node(
        &mut self,
        source: &SceneObject,
        parent: Option<ObjectId>,
        offset: Vector3,
    ) -> Option<ObjectId> {
        let mut copy = source.clone();
        copy.children.clear();
        copy.transform.translation += offset;

        let copy_id = match parent {
            Some(p) => self.add_child(p, copy)?,
            None => {
                let new_id = self.allocate_id();
                copy.id = new_id;
                self.objects.insert(new_id, copy);
                new_id
            }
        };

        if let Some(attrs) = self.attributes.get(source.id).cloned() {
            self.attributes.insert(
                copy_id,
                CadAttributes {
                    selected: false,
                    highlight: None,
                    ..attrs
                },
            );
        }

        for child in &source.children {
            // 叠加层属于原对象的高亮，不复制
            let Some(child_obj) = self.objects.get(child).cloned() else {
                continue;
            };
            if child_obj.role == NodeRole::Overlay {
                continue;
            }
            self.duplicate_node(&child_obj, Some(copy_id), Vector3::zeros())?;
        }
        Some(copy_id)
    }

    /// 清空场景（拆除）
    pub fn clear(&mut self) {
        tracing::debug!("Scene cleared ({} nodes)", self.objects.len());
        self.objects.clear();
        self.tracked.clear();
        self.attributes.clear();
        self.layers.retain(|id, _| *id == LayerId::DEFAULT);
    }
}

fn transform_arc(m: &Matrix4<f64>, arc: &Arc) -> Arc {
    let center = m.transform_point(&arc.center);
    let start = m.transform_point(&arc.start_point());
    let radius = ((start.x - center.x).powi(2) + (start.y - center.y).powi(2)).sqrt();
    let rotated = (start.y - center.y).atan2(start.x - center.x) - arc.start_angle;
    Arc::new(
        center,
        radius,
        arc.start_angle + rotated,
        arc.end_angle + rotated,
    )
}
