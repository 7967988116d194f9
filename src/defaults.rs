//! Built-in bootstrap document, consulted before any persisted state.

use crate::icons;
use crate::model::{Anchors, Edge, Node, NodeData, NodeKind, Point};

pub struct BootstrapDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

fn node(id: &str, label: &str, kind: NodeKind, icon_name: &str) -> Node {
    Node {
        id: id.to_string(),
        kind,
        data: NodeData {
            label: label.to_string(),
            icon_name: icon_name.to_string(),
            color: None,
        },
        position: Point::default(),
        needs_layout: true,
        anchors: Anchors::default(),
        icon: icons::resolve(icon_name, kind),
    }
}

fn edge(source: &str, target: &str) -> Edge {
    Edge {
        id: format!("e-{source}-{target}"),
        source: source.to_string(),
        target: target.to_string(),
        animated: true,
        kind: "smoothstep".to_string(),
    }
}

/// The sample architecture a fresh board starts from: a web frontend behind
/// a gateway, one service tier, and its data stores.
pub fn default_document() -> BootstrapDocument {
    BootstrapDocument {
        nodes: vec![
            node("frontend", "Frontend", NodeKind::Group, "Globe"),
            node("gateway", "Gateway", NodeKind::Group, "Layers"),
            node("service", "Service", NodeKind::Group, "Server"),
            node("database", "Database", NodeKind::Item, "Database"),
            node("queue", "Message Queue", NodeKind::Item, "MessageSquare"),
        ],
        edges: vec![
            edge("frontend", "gateway"),
            edge("gateway", "service"),
            edge("service", "database"),
            edge("service", "queue"),
        ],
    }
}
