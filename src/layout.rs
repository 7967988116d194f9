//! Deterministic tree layout for the board.
//!
//! Coordinates are derived from hierarchy structure alone: depth positions a
//! node along the hierarchy axis, a global leaf counter positions it along
//! the lane axis, and parents are centered over the leaf span of their
//! descendants. Pinned positions from the override map pass through
//! verbatim. The traversal assumes a forest: only the first incoming edge
//! of a node is hierarchical, later incoming edges and cycle-closing edges
//! are excluded from depth/lane computation.

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::model::{Anchors, Architecture, LayoutMode, Node, Point};
use crate::overrides::OverrideMap;

/// Output of one full layout pass: a position for every node in the store
/// plus the connector anchors of the active orientation.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Point>,
    pub anchors: Anchors,
}

struct NodeMeta {
    depth: usize,
    lane: f64,
}

struct Traversal<'a> {
    index: &'a HashMap<&'a str, &'a Node>,
    children: &'a HashMap<&'a str, Vec<&'a str>>,
    mode: LayoutMode,
    config: &'a LayoutConfig,
    meta: HashMap<&'a str, NodeMeta>,
    depth_max: BTreeMap<usize, f64>,
    leaf_counter: usize,
    visited: HashSet<&'a str>,
}

impl<'a> Traversal<'a> {
    fn visit(&mut self, id: &'a str, depth: usize) {
        let Some(node) = self.index.get(id) else {
            return;
        };
        if !self.visited.insert(id) {
            debug!("layout: cycle guard skipped revisit of node {id}");
            return;
        }
        let footprint = footprint(&node.data.label, self.mode, self.config);
        let band = self.depth_max.entry(depth).or_insert(0.0);
        *band = band.max(footprint);

        let kids: Vec<&'a str> = self.children.get(id).cloned().unwrap_or_default();
        let start = self.leaf_counter;
        if kids.is_empty() {
            self.leaf_counter += 1;
        } else {
            for child in kids {
                self.visit(child, depth + 1);
            }
        }
        let end = self.leaf_counter.saturating_sub(1);
        let lane = (start + end) as f64 / 2.0;
        self.meta.insert(id, NodeMeta { depth, lane });
    }
}

fn footprint(label: &str, mode: LayoutMode, config: &LayoutConfig) -> f64 {
    let estimated = label.chars().count() as f64 * config.per_char_width + config.label_padding;
    estimated.max(config.footprint_floor(mode))
}

/// Computes canvas positions for every node lacking an override in the
/// active orientation. Never fails: nodes unreachable from any root are
/// stacked deterministically at a fixed offset column.
pub fn compute_layout(
    arch: &Architecture,
    mode: LayoutMode,
    overrides: &OverrideMap,
    config: &LayoutConfig,
) -> LayoutResult {
    let index: HashMap<&str, &Node> =
        arch.nodes().iter().map(|n| (n.id.as_str(), n)).collect();

    // Hierarchical adjacency: the first incoming non-self edge claims the
    // target, everything after is a non-hierarchical reference.
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in arch.edges() {
        if edge.source == edge.target {
            debug!("layout: self edge {} ignored", edge.id);
            continue;
        }
        if claimed.insert(edge.target.as_str()) {
            children
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        } else {
            debug!(
                "layout: edge {} -> {} excluded, target already has a hierarchical parent",
                edge.source, edge.target
            );
        }
    }

    let mut traversal = Traversal {
        index: &index,
        children: &children,
        mode,
        config,
        meta: HashMap::new(),
        depth_max: BTreeMap::new(),
        leaf_counter: 0,
        visited: HashSet::new(),
    };
    for node in arch.nodes() {
        if !claimed.contains(node.id.as_str()) {
            traversal.visit(node.id.as_str(), 0);
        }
    }

    // Cumulative offsets along the hierarchy axis: each depth band is as
    // wide as its widest footprint plus the orientation's gutter.
    let mut offsets: HashMap<usize, f64> = HashMap::new();
    let mut cursor = config.margin;
    if let Some(max_depth) = traversal.depth_max.keys().next_back().copied() {
        for depth in 0..=max_depth {
            offsets.insert(depth, cursor);
            let band = traversal
                .depth_max
                .get(&depth)
                .copied()
                .unwrap_or(config.default_band);
            cursor += band + config.gutter(mode);
        }
    }

    let anchors = Anchors::for_mode(mode);
    let mut positions = BTreeMap::new();
    let mut fallback_index = 0usize;
    for node in arch.nodes() {
        let id = node.id.as_str();
        if let Some(pinned) = overrides.get(mode, id) {
            positions.insert(id.to_string(), pinned);
            continue;
        }
        let position = match traversal.meta.get(id) {
            Some(meta) => {
                let band = offsets.get(&meta.depth).copied().unwrap_or(config.margin);
                let lane = config.margin + meta.lane * config.lane_step(mode);
                match mode {
                    LayoutMode::Horizontal => Point::new(band, lane),
                    LayoutMode::Vertical => Point::new(lane, band),
                }
            }
            None => {
                debug!("layout: node {id} unreachable from any root, using fallback stack");
                let stacked = Point::new(
                    config.margin,
                    config.margin + fallback_index as f64 * config.fallback_step,
                );
                fallback_index += 1;
                stacked
            }
        };
        positions.insert(id.to_string(), position);
    }

    LayoutResult { positions, anchors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    /// Root A (group) with children B, C (items) and D (group) holding E.
    fn example_tree() -> (Architecture, [String; 5]) {
        let mut arch = Architecture::new();
        let a = arch.add_node("A", NodeKind::Group, None, None);
        let b = arch.add_node("B", NodeKind::Item, Some(&a), None);
        let c = arch.add_node("C", NodeKind::Item, Some(&a), None);
        let d = arch.add_node("D", NodeKind::Group, Some(&a), None);
        let e = arch.add_node("E", NodeKind::Item, Some(&d), None);
        (arch, [a, b, c, d, e])
    }

    fn pos(result: &LayoutResult, id: &str) -> Point {
        result.positions[id]
    }

    #[test]
    fn horizontal_depths_and_lanes_follow_the_tree() {
        let (arch, [a, b, c, d, e]) = example_tree();
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Horizontal, &OverrideMap::default(), &config);

        // Single-char labels all hit the 140 floor, so bands step by 220.
        assert_eq!(pos(&result, &a).x, 40.0);
        for id in [&b, &c, &d] {
            assert_eq!(pos(&result, id).x, 260.0);
        }
        assert_eq!(pos(&result, &e).x, 480.0);

        // Leaves B, C, E take lanes 0, 1, 2; D centers over E; A over all.
        assert_eq!(pos(&result, &b).y, 40.0);
        assert_eq!(pos(&result, &c).y, 130.0);
        assert_eq!(pos(&result, &e).y, 220.0);
        assert_eq!(pos(&result, &d).y, pos(&result, &e).y);
        assert_eq!(pos(&result, &a).y, 130.0);
        assert_eq!(result.anchors, Anchors::for_mode(LayoutMode::Horizontal));
    }

    #[test]
    fn vertical_mode_swaps_the_axes() {
        let (arch, [a, b, _c, _d, e]) = example_tree();
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Vertical, &OverrideMap::default(), &config);

        assert_eq!(pos(&result, &a).y, 40.0);
        // Vertical floor 120 + gutter 100.
        assert_eq!(pos(&result, &b).y, 260.0);
        assert_eq!(pos(&result, &e).y, 480.0);
        // Lane axis is x with the 150 step.
        assert_eq!(pos(&result, &b).x, 40.0);
        assert_eq!(pos(&result, &e).x, 340.0);
        assert_eq!(result.anchors, Anchors::for_mode(LayoutMode::Vertical));
    }

    #[test]
    fn recomputing_is_deterministic() {
        let (arch, _) = example_tree();
        let config = LayoutConfig::default();
        let overrides = OverrideMap::default();
        let first = compute_layout(&arch, LayoutMode::Horizontal, &overrides, &config);
        let second = compute_layout(&arch, LayoutMode::Horizontal, &overrides, &config);
        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn override_wins_in_its_mode_only() {
        let (arch, [_a, b, ..]) = example_tree();
        let config = LayoutConfig::default();
        let mut overrides = OverrideMap::default();
        overrides.record(LayoutMode::Horizontal, &b, Point::new(500.0, 500.0));

        let horizontal =
            compute_layout(&arch, LayoutMode::Horizontal, &overrides, &config);
        assert_eq!(pos(&horizontal, &b), Point::new(500.0, 500.0));

        let vertical = compute_layout(&arch, LayoutMode::Vertical, &overrides, &config);
        assert_ne!(pos(&vertical, &b), Point::new(500.0, 500.0));
    }

    #[test]
    fn wider_labels_widen_their_depth_band() {
        let mut arch = Architecture::new();
        let root = arch.add_node(
            "An unusually verbose root component label",
            NodeKind::Group,
            None,
            None,
        );
        let child = arch.add_node("Leaf", NodeKind::Item, Some(&root), None);
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Horizontal, &OverrideMap::default(), &config);

        let label_chars = "An unusually verbose root component label".chars().count() as f64;
        let band = label_chars * 8.5 + 40.0;
        assert_eq!(pos(&result, &child).x, 40.0 + band + 80.0);
    }

    #[test]
    fn second_parent_edge_does_not_move_the_child() {
        let mut arch = Architecture::new();
        let a = arch.add_node("A", NodeKind::Group, None, None);
        let b = arch.add_node("B", NodeKind::Group, None, None);
        let c = arch.add_node("C", NodeKind::Item, Some(&a), None);
        arch.connect(&b, &c);
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Horizontal, &OverrideMap::default(), &config);

        // C stays at depth 1 under A; B is a childless root on its own lane.
        assert_eq!(pos(&result, &c).x, 260.0);
        assert_eq!(pos(&result, &c).y, 40.0);
        assert_eq!(pos(&result, &b).x, 40.0);
        assert_eq!(pos(&result, &b).y, 130.0);
    }

    #[test]
    fn cycle_without_root_falls_back_to_the_stack() {
        let mut arch = Architecture::new();
        let x = arch.add_node("X", NodeKind::Item, None, None);
        let y = arch.add_node("Y", NodeKind::Item, None, None);
        arch.connect(&x, &y);
        arch.connect(&y, &x);
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Horizontal, &OverrideMap::default(), &config);

        assert_eq!(pos(&result, &x), Point::new(40.0, 40.0));
        assert_eq!(pos(&result, &y), Point::new(40.0, 100.0));
    }

    #[test]
    fn node_claimed_by_a_ghost_source_still_gets_a_position() {
        let mut arch = Architecture::new();
        let orphan = arch.add_node("Orphan", NodeKind::Item, None, None);
        arch.connect("long-gone", &orphan);
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Horizontal, &OverrideMap::default(), &config);

        assert_eq!(pos(&result, &orphan), Point::new(40.0, 40.0));
    }

    #[test]
    fn every_store_node_receives_a_position() {
        let (arch, ids) = example_tree();
        let config = LayoutConfig::default();
        let result = compute_layout(&arch, LayoutMode::Horizontal, &OverrideMap::default(), &config);
        for id in &ids {
            assert!(result.positions.contains_key(id.as_str()));
        }
        assert_eq!(result.positions.len(), arch.nodes().len());
    }
}
