//! Tree operations: insert, remove, move, walk, and the per-node style cache.

use std::collections::{HashMap, VecDeque};

use slotmap::{SecondaryMap, SlotMap};

use super::node::{InteractionState, NodeData, NodeId, TransientState};
use crate::css::cascade::{resolve_with_parent, CascadeEnv, ResolvedStyle};
use crate::css::stylesheet::Stylesheet;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// A rejected tree mutation. The tree is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralViolation {
    #[error("cannot move '{node}' under its own descendant '{parent}'")]
    Cycle { node: String, parent: String },
    #[error("duplicate node id '{0}'")]
    DuplicateId(String),
    #[error("node does not exist in this tree")]
    UnknownNode,
    #[error("'{node}' is not a child of '{parent}'")]
    NotAChild { node: String, parent: String },
    #[error("child index {index} out of range (parent has {len} children)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{0}")]
    RootViolation(&'static str),
}

/// Which stylesheet and environment the cached styles were computed for.
#[derive(Debug, Clone, PartialEq)]
struct StyleKey {
    generation: u64,
    env: CascadeEnv,
}

/// The node tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Every mutation keeps ids unique, gives each non-root node one parent and
/// rejects cycles; resolved styles of affected subtrees are dropped on commit.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
    ids: HashMap<String, NodeId>,
    styles: SecondaryMap<NodeId, ResolvedStyle>,
    style_key: Option<StyleKey>,
}

impl Dom {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            ids: HashMap::new(),
            styles: SecondaryMap::new(),
            style_key: None,
        }
    }

    /// Create a tree holding just `root`.
    pub fn with_root(data: NodeData) -> (Self, NodeId) {
        let mut dom = Self::new();
        let id = dom.attach(data, None);
        dom.root = Some(id);
        (dom, id)
    }

    /// Insert the root node. Fails if the tree already has one.
    pub fn insert_root(&mut self, data: NodeData) -> Result<NodeId, StructuralViolation> {
        if self.root.is_some() {
            return Err(StructuralViolation::RootViolation("tree already has a root"));
        }
        if self.ids.contains_key(&data.id) {
            return Err(StructuralViolation::DuplicateId(data.id));
        }
        let id = self.attach(data, None);
        self.root = Some(id);
        Ok(id)
    }

    /// Insert `data` as the child of `parent` at `index`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        data: NodeData,
    ) -> Result<NodeId, StructuralViolation> {
        let len = self.existing(parent)?.len();
        if index > len {
            return Err(StructuralViolation::IndexOutOfRange { index, len });
        }
        if self.ids.contains_key(&data.id) {
            return Err(StructuralViolation::DuplicateId(data.id));
        }
        let id = self.attach(data, Some(parent));
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.insert(index, id);
        }
        Ok(id)
    }

    /// Append `data` as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, StructuralViolation> {
        let len = self.existing(parent)?.len();
        self.insert_child(parent, len, data)
    }

    fn attach(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let key = data.id.clone();
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(parent) = parent {
            self.parent.insert(id, parent);
        }
        self.ids.insert(key, id);
        id
    }

    fn existing(&self, id: NodeId) -> Result<&Vec<NodeId>, StructuralViolation> {
        self.children.get(id).ok_or(StructuralViolation::UnknownNode)
    }

    /// Remove `node` and its subtree from `parent`.
    ///
    /// Returns the removed nodes' data in depth-first order.
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
    ) -> Result<Vec<NodeData>, StructuralViolation> {
        self.existing(parent)?;
        self.existing(node)?;
        if self.parent(node) != Some(parent) {
            return Err(StructuralViolation::NotAChild {
                node: self.id_of(node),
                parent: self.id_of(parent),
            });
        }
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&child| child != node);
        }

        let order = self.walk_depth_first(node);
        let mut removed = Vec::with_capacity(order.len());
        for current in order {
            self.children.remove(current);
            self.parent.remove(current);
            self.styles.remove(current);
            if let Some(data) = self.nodes.remove(current) {
                self.ids.remove(&data.id);
                removed.push(data);
            }
        }
        Ok(removed)
    }

    /// Move `node` (with its subtree) to `new_parent` at `index`.
    ///
    /// `index` counts the new parent's children without `node`. Moving a node
    /// under itself or one of its descendants fails with
    /// [`StructuralViolation::Cycle`].
    pub fn move_child(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> Result<(), StructuralViolation> {
        self.existing(node)?;
        self.existing(new_parent)?;
        if self.root == Some(node) {
            return Err(StructuralViolation::RootViolation("the root cannot be moved"));
        }
        if node == new_parent || self.ancestors(new_parent).contains(&node) {
            return Err(StructuralViolation::Cycle {
                node: self.id_of(node),
                parent: self.id_of(new_parent),
            });
        }
        let len = self.children(new_parent).iter().filter(|&&c| c != node).count();
        if index > len {
            return Err(StructuralViolation::IndexOutOfRange { index, len });
        }

        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
        }
        self.parent.insert(node, new_parent);
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.insert(index, node);
        }
        self.invalidate_subtree(node);
        Ok(())
    }

    /// Apply `edit` to a node's data and commit it.
    ///
    /// The node's subtree loses its cached styles. If the edit renames the
    /// node to an id already in use, it is rolled back.
    pub fn update(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut NodeData),
    ) -> Result<(), StructuralViolation> {
        let data = self.nodes.get_mut(id).ok_or(StructuralViolation::UnknownNode)?;
        let before = data.clone();
        edit(data);

        if data.id != before.id {
            if self.ids.contains_key(&data.id) {
                let taken = data.id.clone();
                *data = before;
                return Err(StructuralViolation::DuplicateId(taken));
            }
            self.ids.remove(&before.id);
            self.ids.insert(data.id.clone(), id);
        }
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Turn an interaction state on or off. Returns `true` if it changed.
    pub fn set_state(&mut self, id: NodeId, state: InteractionState, on: bool) -> bool {
        let changed = self.nodes.get_mut(id).is_some_and(|data| data.states.set(state, on));
        if changed {
            self.invalidate_subtree(id);
        }
        changed
    }

    /// Transient state is not styled, so editing it keeps the cache.
    pub fn transient_mut(&mut self, id: NodeId) -> Option<&mut TransientState> {
        self.nodes.get_mut(id).map(|data| &mut data.transient)
    }

    fn id_of(&self, id: NodeId) -> String {
        self.nodes.get(id).map(|d| d.id.clone()).unwrap_or_default()
    }

    // -- Lookup ---------------------------------------------------------------

    /// Look a node up by its string id.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// The root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Breadth-first traversal starting from `start`.
    pub fn walk_breadth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            queue.extend(self.children(current).iter().copied());
        }
        result
    }

    // -- Style cache ----------------------------------------------------------

    /// Drop cached styles of `id` and all its descendants.
    pub fn invalidate_subtree(&mut self, id: NodeId) {
        for node in self.walk_depth_first(id) {
            self.styles.remove(node);
        }
    }

    /// Drop every cached style.
    pub fn invalidate_styles(&mut self) {
        self.styles.clear();
    }

    /// The resolved style of `id`, computing it (and any missing ancestor
    /// styles) if needed.
    ///
    /// A stylesheet edit or environment change since the last call drops the
    /// whole cache first.
    pub fn style(&mut self, id: NodeId, sheet: &Stylesheet, env: &CascadeEnv) -> Option<&ResolvedStyle> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.check_style_key(sheet, env);

        let mut chain = vec![id];
        chain.extend(self.ancestors(id));
        for &node in chain.iter().rev() {
            if self.styles.contains_key(node) {
                continue;
            }
            let parent_style = self.parent(node).and_then(|p| self.styles.get(p));
            let Some(data) = self.nodes.get(node) else { continue };
            let style = resolve_with_parent(data, sheet, parent_style, env);
            self.styles.insert(node, style);
        }
        self.styles.get(id)
    }

    /// Resolve every node below `start` that has no cached style.
    pub fn resolve_styles(&mut self, start: NodeId, sheet: &Stylesheet, env: &CascadeEnv) {
        self.check_style_key(sheet, env);
        for node in self.walk_depth_first(start) {
            self.style(node, sheet, env);
        }
    }

    /// A cached style, without resolving. `None` if missing or invalidated.
    pub fn cached_style(&self, id: NodeId) -> Option<&ResolvedStyle> {
        self.styles.get(id)
    }

    fn check_style_key(&mut self, sheet: &Stylesheet, env: &CascadeEnv) {
        let current = self.style_key.as_ref();
        if current.map_or(true, |k| k.generation != sheet.generation() || k.env != *env) {
            self.styles.clear();
            self.style_key = Some(StyleKey { generation: sheet.generation(), env: env.clone() });
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
