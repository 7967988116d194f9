//! Canonical document model: nodes, edges, and the mutation API.
//!
//! Serde attributes on [`Node`] and [`Edge`] pin the persisted wire schema
//! (`type`, `iconName`, ...) so documents written by earlier builds of the
//! board stay loadable. Runtime-only fields (`needs_layout`, anchors, the
//! resolved icon glyph) are skipped during serialization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::icons::{self, IconGlyph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Group,
    Item,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "group" => Some(Self::Group),
            "item" => Some(Self::Item),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
}

impl LayoutMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "horizontal" | "h" => Some(Self::Horizontal),
            "vertical" | "v" => Some(Self::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of a node an edge connector attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Connector attachment sides for the active orientation. Updated by layout
/// for every node, including ones sitting at a pinned position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub input: Side,
    pub output: Side,
}

impl Anchors {
    pub fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Horizontal => Self {
                input: Side::Left,
                output: Side::Right,
            },
            LayoutMode::Vertical => Self {
                input: Side::Top,
                output: Side::Bottom,
            },
        }
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Self::for_mode(LayoutMode::Horizontal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    #[serde(rename = "iconName")]
    pub icon_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub data: NodeData,
    #[serde(default)]
    pub position: Point,
    #[serde(skip)]
    pub needs_layout: bool,
    #[serde(skip)]
    pub anchors: Anchors,
    #[serde(skip, default = "icons::placeholder")]
    pub icon: &'static IconGlyph,
}

fn default_edge_kind() -> String {
    "smoothstep".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(rename = "type", default = "default_edge_kind")]
    pub kind: String,
}

/// Visual-field patch for [`Architecture::update_node_data`]. Absent fields
/// are left untouched; position is never part of a patch.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub label: Option<String>,
    pub icon_name: Option<String>,
    pub color: Option<String>,
}

/// The graph store: canonical node/edge collections plus selection and the
/// incrementally maintained child -> hierarchical-parent index.
///
/// All operations are synchronous and last-write-wins. Mutations addressing
/// an unknown id are silent no-ops. Node order is insertion order, which
/// layout traversal relies on for determinism.
#[derive(Debug, Clone, Default)]
pub struct Architecture {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected: Option<String>,
    parents: HashMap<String, String>,
}

impl Architecture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a store from already-deserialized parts and resolves icon
    /// glyphs (this is a load/import boundary).
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut arch = Self {
            nodes,
            edges,
            selected: None,
            parents: HashMap::new(),
        };
        arch.rebuild_parent_index();
        arch.resolve_icons();
        arch
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Hierarchical parent of a node: the source of its first incoming
    /// non-self edge. Answered from the reverse index, not an edge scan.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    pub fn any_needs_layout(&self) -> bool {
        self.nodes.iter().any(|n| n.needs_layout)
    }

    /// Creates a node flagged for layout and, when a parent is given, the
    /// parent -> child edge. Ids are freshly generated and never reused.
    pub fn add_node(
        &mut self,
        label: &str,
        kind: NodeKind,
        parent: Option<&str>,
        icon_name: Option<&str>,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let icon_name = icon_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| icons::default_name(kind))
            .to_string();
        let color = match kind {
            NodeKind::Group => Some("bg-slate-500/10 border-slate-500/50 text-slate-500".to_string()),
            NodeKind::Item => None,
        };
        let icon = icons::resolve(&icon_name, kind);
        self.nodes.push(Node {
            id: id.clone(),
            kind,
            data: NodeData {
                label: label.to_string(),
                icon_name,
                color,
            },
            position: Point::default(),
            needs_layout: true,
            anchors: Anchors::default(),
            icon,
        });
        if let Some(parent) = parent {
            self.connect(parent, &id);
        }
        id
    }

    /// Appends a directed edge. Duplicate (source, target) pairs accumulate;
    /// every edge gets a fresh id so they never collide.
    pub fn connect(&mut self, source: &str, target: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.edges.push(Edge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            animated: true,
            kind: default_edge_kind(),
        });
        if source != target && !self.parents.contains_key(target) {
            self.parents.insert(target.to_string(), source.to_string());
        }
        id
    }

    pub fn delete_node(&mut self, id: &str) {
        self.delete_nodes(&[id.to_string()]);
    }

    /// Removes the nodes and every edge touching them. Children of a removed
    /// group are left in place and become roots. Unknown ids are no-ops.
    pub fn delete_nodes(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
        if let Some(selected) = &self.selected
            && ids.contains(selected)
        {
            self.selected = None;
        }
        self.rebuild_parent_index();
    }

    /// Removes exactly the named edge; no-op if unknown.
    pub fn delete_edge(&mut self, id: &str) {
        let Some(index) = self.edges.iter().position(|e| e.id == id) else {
            return;
        };
        let removed = self.edges.remove(index);
        self.reindex_parent(&removed.target);
    }

    /// Shallow-merges visual fields; position is untouched.
    pub fn update_node_data(&mut self, id: &str, patch: NodePatch) {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return;
        };
        if let Some(label) = patch.label {
            node.data.label = label;
        }
        if let Some(icon_name) = patch.icon_name {
            node.data.icon_name = icon_name;
            node.icon = icons::resolve(&node.data.icon_name, node.kind);
        }
        if let Some(color) = patch.color {
            node.data.color = Some(color);
        }
    }

    pub fn rename_node(&mut self, id: &str, new_label: &str) {
        self.update_node_data(
            id,
            NodePatch {
                label: Some(new_label.to_string()),
                ..NodePatch::default()
            },
        );
    }

    /// Wholesale replacement used by bulk import. No schema validation is
    /// performed; whatever arrives becomes the document.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.selected = None;
        self.rebuild_parent_index();
        self.resolve_icons();
    }

    /// Moves one node; returns false for unknown ids.
    pub fn set_position(&mut self, id: &str, position: Point) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        node.needs_layout = false;
        true
    }

    /// Applies a computed layout: every listed node takes its position, all
    /// nodes take the orientation's anchors, and layout flags clear.
    pub fn apply_positions(
        &mut self,
        positions: &std::collections::BTreeMap<String, Point>,
        anchors: Anchors,
    ) {
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
            node.anchors = anchors;
            node.needs_layout = false;
        }
    }

    fn resolve_icons(&mut self) {
        for node in &mut self.nodes {
            node.icon = icons::resolve(&node.data.icon_name, node.kind);
        }
    }

    fn rebuild_parent_index(&mut self) {
        self.parents.clear();
        for edge in &self.edges {
            if edge.source == edge.target {
                continue;
            }
            if !self.parents.contains_key(&edge.target) {
                self.parents
                    .insert(edge.target.clone(), edge.source.clone());
            }
        }
    }

    fn reindex_parent(&mut self, target: &str) {
        self.parents.remove(target);
        let parent = self
            .edges
            .iter()
            .find(|e| e.target == target && e.source != e.target)
            .map(|e| e.source.clone());
        if let Some(parent) = parent {
            self.parents.insert(target.to_string(), parent);
        }
    }
}
