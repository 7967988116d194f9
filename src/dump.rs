use serde::Serialize;

use crate::builder::Builder;
use crate::model::Side;

#[derive(Debug, Serialize)]
pub struct BoardDump {
    pub mode: String,
    pub selected: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub icon: String,
    pub symbol: String,
    pub color: Option<String>,
    pub x: f64,
    pub y: f64,
    pub parent: Option<String>,
    pub pinned: bool,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub animated: bool,
    pub kind: String,
}

fn side_token(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
        Side::Top => "top",
        Side::Bottom => "bottom",
    }
}

impl BoardDump {
    pub fn from_builder(builder: &Builder) -> Self {
        let arch = builder.architecture();
        let mode = builder.mode();
        let nodes = arch
            .nodes()
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: format!("{:?}", node.kind).to_lowercase(),
                label: node.data.label.clone(),
                icon: node.icon.name.to_string(),
                symbol: node.icon.symbol.to_string(),
                color: node.data.color.clone(),
                x: node.position.x,
                y: node.position.y,
                parent: arch.parent_of(&node.id).map(str::to_string),
                pinned: builder.overrides().get(mode, &node.id).is_some(),
                input: side_token(node.anchors.input).to_string(),
                output: side_token(node.anchors.output).to_string(),
            })
            .collect();
        let edges = arch
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                animated: edge.animated,
                kind: edge.kind.clone(),
            })
            .collect();
        BoardDump {
            mode: format!("{mode:?}").to_lowercase(),
            selected: builder.selected().map(str::to_string),
            nodes,
            edges,
        }
    }
}

pub fn render_dump(builder: &Builder) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&BoardDump::from_builder(builder))?)
}
