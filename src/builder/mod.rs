//! Builder: turns a [`NodeDescription`] into a [`Dom`] with attachments.
//!
//! [`Builder::build`] constructs a tree from scratch. [`Builder::reconcile`]
//! applies a new description to an existing tree: nodes whose id and type
//! are unchanged are updated in place, keeping their [`NodeId`], interaction
//! and transient state and, when their bindings are unchanged, their
//! attachment. Nodes missing from the new description are detached and then
//! removed; new nodes are created fresh.
//!
//! The work happens on a copy of the previous tree, so a caller sees either
//! the old tree or the fully built new one. Problems with individual nodes
//! never abort the build: an unreadable node, an unknown type or a missing
//! required property replaces that subtree with a placeholder and records a
//! [`Diagnostic`].

pub mod attachments;
pub mod reload;

use std::collections::{HashMap, HashSet};

use crate::css::stylesheet::Stylesheet;
use crate::description::{DescriptionError, NodeDescription};
use crate::dom::node::{NodeData, NodeId, NodeType};
use crate::dom::tree::{Dom, StructuralViolation};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::param::AttachmentBridge;

pub use attachments::{Attachments, NodeAttachment};
pub use reload::{ReloadListener, ReloadQueue, ReloadRequest, ReloadSender};

/// Id prefix of generated placeholder ids.
const PLACEHOLDER_PREFIX: &str = "placeholder";

/// The result of a build or reconcile.
#[derive(Debug)]
pub struct BuildOutput {
    pub dom: Dom,
    pub attachments: Attachments,
    pub diagnostics: Diagnostics,
}

/// Builds trees against one stylesheet and parameter bridge.
pub struct Builder<'a> {
    sheet: &'a Stylesheet,
    bridge: &'a mut AttachmentBridge,
}

impl<'a> Builder<'a> {
    pub fn new(sheet: &'a Stylesheet, bridge: &'a mut AttachmentBridge) -> Self {
        Self { sheet, bridge }
    }

    /// Build a new tree from `description`.
    pub fn build(&mut self, description: &NodeDescription) -> BuildOutput {
        self.reconcile(&Dom::new(), Attachments::new(), description)
    }

    /// Apply `description` to a copy of `previous`, reusing the matching
    /// entries of `attachments`. Unused attachments are detached.
    pub fn reconcile(
        &mut self,
        previous: &Dom,
        attachments: Attachments,
        description: &NodeDescription,
    ) -> BuildOutput {
        let mut pass = Pass {
            sheet: self.sheet,
            bridge: &mut *self.bridge,
            dom: previous.clone(),
            old: attachments,
            new: Attachments::new(),
            diagnostics: Diagnostics::new(),
            claimed: HashSet::new(),
            ids: IdAllocator::new(description),
            reused: 0,
        };
        pass.run(description);
        pass.finish()
    }
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Hands out node ids for one pass: explicit ids once each, generated
/// `<type>-<n>` ids for unnamed nodes that avoid every explicit id.
struct IdAllocator {
    reserved: HashSet<String>,
    used: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl IdAllocator {
    fn new(description: &NodeDescription) -> Self {
        let mut reserved = HashSet::new();
        collect_ids(description, &mut reserved);
        Self { reserved, used: HashSet::new(), counters: HashMap::new() }
    }

    fn claim(&mut self, explicit: Option<&str>, tag: &str) -> Result<String, StructuralViolation> {
        match explicit {
            Some(id) if self.used.contains(id) => Err(StructuralViolation::DuplicateId(id.to_owned())),
            Some(id) => {
                self.used.insert(id.to_owned());
                Ok(id.to_owned())
            }
            None => Ok(self.generate(tag)),
        }
    }

    fn generate(&mut self, tag: &str) -> String {
        let prefix = tag.to_ascii_lowercase();
        let counter = self.counters.entry(prefix.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{prefix}-{counter}");
            if !self.reserved.contains(&candidate) && !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
        }
    }
}

fn collect_ids(description: &NodeDescription, out: &mut HashSet<String>) {
    if let Some(id) = &description.id {
        out.insert(id.clone());
    }
    for child in &description.children {
        collect_ids(child, out);
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

struct Pass<'a> {
    sheet: &'a Stylesheet,
    bridge: &'a mut AttachmentBridge,
    dom: Dom,
    old: Attachments,
    new: Attachments,
    diagnostics: Diagnostics,
    /// Nodes of the new tree. Every ancestor of a claimed node is claimed.
    claimed: HashSet<NodeId>,
    ids: IdAllocator,
    reused: usize,
}

impl Pass<'_> {
    fn run(&mut self, description: &NodeDescription) {
        let (data, build_children) = self.prepare(description);

        let root = match self.dom.root() {
            Some(root) if self.matches(root, &data) => {
                self.update(root, data);
                root
            }
            _ => {
                let (dom, root) = Dom::with_root(data);
                self.dom = dom;
                root
            }
        };
        self.claim(root);

        if build_children {
            self.place_children(root, description);
        }
    }

    fn place_children(&mut self, parent: NodeId, description: &NodeDescription) {
        let mut index = 0;
        for child in &description.children {
            if let Some(node) = self.place(parent, index, child) {
                index += 1;
                self.claim(node);
                if self.dom.get(node).is_some_and(|d| d.node_type != NodeType::Placeholder) {
                    self.place_children(node, child);
                }
            }
        }
    }

    /// Put the node for `description` at `index` under `parent`, reusing an
    /// unclaimed node with the same id and type.
    fn place(&mut self, parent: NodeId, index: usize, description: &NodeDescription) -> Option<NodeId> {
        let (data, _) = self.prepare(description);

        if let Some(existing) = self.dom.find_by_id(&data.id) {
            if self.matches(existing, &data) {
                let in_place = self.dom.parent(existing) == Some(parent)
                    && self.dom.children(parent).get(index) == Some(&existing);
                if !in_place {
                    if let Err(err) = self.dom.move_child(existing, parent, index) {
                        log::warn!("could not move '{}': {err}", data.id);
                        return None;
                    }
                }
                self.update(existing, data);
                return Some(existing);
            }
            // Same id, different type: the old node goes now so the id is free.
            self.discard(existing);
        }

        match self.dom.insert_child(parent, index, data) {
            Ok(node) => Some(node),
            Err(err) => {
                self.diagnostics.push(Diagnostic::malformed(err.to_string()));
                None
            }
        }
    }

    /// Validate `description` and produce the node data to commit. The flag
    /// is `false` for placeholders, whose children are not built.
    fn prepare(&mut self, description: &NodeDescription) -> (NodeData, bool) {
        let node_type = match description.validate() {
            Ok(node_type) => node_type,
            Err(err) => {
                let kind = match err {
                    DescriptionError::UnknownType(_) => DiagnosticKind::UnresolvableReference,
                    _ => DiagnosticKind::MalformedDescription,
                };
                return (self.placeholder(description, err.to_string(), kind), false);
            }
        };

        let id = match self.ids.claim(description.id.as_deref(), node_type.tag()) {
            Ok(id) => id,
            Err(err) => {
                return (self.placeholder(description, err.to_string(), DiagnosticKind::MalformedDescription), false)
            }
        };

        let (data, errors) = description.to_node_data(node_type, id);
        for err in errors {
            self.diagnostics.push(Diagnostic::invalid_property(err.to_string()).for_node(data.id.clone()));
        }
        for class in &data.classes {
            if self.sheet.class(class).is_none() {
                self.diagnostics
                    .push(Diagnostic::unresolved(format!("unknown style class '{class}'")).for_node(data.id.clone()));
            }
        }
        (data, true)
    }

    fn placeholder(&mut self, description: &NodeDescription, message: String, kind: DiagnosticKind) -> NodeData {
        let id = match self.ids.claim(description.id.as_deref(), PLACEHOLDER_PREFIX) {
            Ok(id) => id,
            Err(_) => self.ids.generate(PLACEHOLDER_PREFIX),
        };
        self.diagnostics.push(Diagnostic::new(kind, message.clone()).for_node(id.clone()));
        NodeData::placeholder(id, message)
    }

    fn matches(&self, node: NodeId, data: &NodeData) -> bool {
        !self.claimed.contains(&node)
            && self.dom.get(node).is_some_and(|d| d.id == data.id && d.node_type == data.node_type)
    }

    /// Overwrite the described parts of a kept node. Interaction and
    /// transient state stay.
    fn update(&mut self, node: NodeId, data: NodeData) {
        self.reused += 1;
        let unchanged = self.dom.get(node).is_some_and(|d| {
            d.classes == data.classes && d.properties == data.properties && d.bindings == data.bindings
        });
        if unchanged {
            return;
        }
        let result = self.dom.update(node, |d| {
            d.classes = data.classes;
            d.properties = data.properties;
            d.bindings = data.bindings;
        });
        if let Err(err) = result {
            log::warn!("could not update node: {err}");
        }
    }

    /// Mark `node` as part of the new tree and give it its attachment.
    fn claim(&mut self, node: NodeId) {
        self.claimed.insert(node);
        let Some(data) = self.dom.get(node) else { return };
        let attachment = match self.old.take_matching(data) {
            Some(kept) => Some(kept),
            None => NodeAttachment::create(data, self.bridge),
        };
        if let Some(attachment) = attachment {
            self.new.insert(data, attachment);
        }
    }

    /// Detach the attachments under `node`, then remove it.
    fn discard(&mut self, node: NodeId) {
        for id in self.dom.walk_depth_first(node) {
            if let Some(data) = self.dom.get(id) {
                self.old.remove(&data.id);
            }
        }
        if let Some(parent) = self.dom.parent(node) {
            if let Err(err) = self.dom.remove_child(parent, node) {
                log::warn!("could not remove stale node: {err}");
            }
        }
    }

    fn finish(mut self) -> BuildOutput {
        // Attachments of nodes that did not survive are detached before any
        // node is removed.
        self.old.clear();

        let mut stale = Vec::new();
        if let Some(root) = self.dom.root() {
            for node in self.dom.walk_depth_first(root) {
                if self.claimed.contains(&node) {
                    continue;
                }
                if let Some(parent) = self.dom.parent(node).filter(|p| self.claimed.contains(p)) {
                    stale.push((parent, node));
                }
            }
        }
        let mut removed = 0;
        for (parent, node) in stale {
            match self.dom.remove_child(parent, node) {
                Ok(nodes) => removed += nodes.len(),
                Err(err) => log::warn!("could not remove stale node: {err}"),
            }
        }

        self.diagnostics.append(self.bridge.take_diagnostics());
        log::debug!(
            "built {} nodes ({} kept, {} removed, {} attachments, {} diagnostics)",
            self.dom.len(),
            self.reused,
            removed,
            self.new.len(),
            self.diagnostics.len()
        );
        BuildOutput {
            dom: self.dom,
            attachments: self.new,
            diagnostics: self.diagnostics,
        }
    }
}
