//! The editing session: wires the graph store, layout engine, override
//! tracker, and sync service together behind the gesture-level API the
//! interaction layer calls.
//!
//! Layout recomputes only when a node is flagged as needing layout or the
//! orientation changes - never on incidental mutations - so in-place drags
//! are not undone by unrelated edits.

use std::time::Instant;

use crate::config::Config;
use crate::layout;
use crate::model::{Architecture, Edge, LayoutMode, Node, NodeKind, NodePatch, Point};
use crate::overrides::OverrideMap;
use crate::store::DocumentStore;
use crate::sync::{self, DocumentState, SyncService};

pub struct Builder {
    architecture: Architecture,
    mode: LayoutMode,
    overrides: OverrideMap,
    store: DocumentStore,
    sync: SyncService,
    config: Config,
}

impl Builder {
    /// Rehydrates the persisted document (or the bootstrap default) and runs
    /// the initial layout pass before any interaction.
    pub fn open(store: DocumentStore, config: Config) -> Self {
        let loaded = sync::load_document(&store);
        let mut builder = Self {
            architecture: loaded.architecture,
            mode: loaded.mode,
            overrides: loaded.overrides,
            sync: SyncService::new(config.sync.clone()),
            store,
            config,
        };
        builder.refresh_layout();
        builder
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    pub fn is_syncing(&self, now: Instant) -> bool {
        self.sync.is_syncing(now)
    }

    pub fn selected(&self) -> Option<&str> {
        self.architecture.selected()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.architecture.select(id);
    }

    pub fn add_node(
        &mut self,
        now: Instant,
        label: &str,
        kind: NodeKind,
        parent: Option<&str>,
        icon_name: Option<&str>,
    ) -> String {
        let id = self.architecture.add_node(label, kind, parent, icon_name);
        self.refresh_if_flagged();
        self.sync.mark_dirty(now);
        id
    }

    pub fn connect(&mut self, now: Instant, source: &str, target: &str) -> String {
        let id = self.architecture.connect(source, target);
        self.sync.mark_dirty(now);
        id
    }

    pub fn delete_node(&mut self, now: Instant, id: &str) {
        self.architecture.delete_node(id);
        self.sync.mark_dirty(now);
    }

    pub fn delete_nodes(&mut self, now: Instant, ids: &[String]) {
        self.architecture.delete_nodes(ids);
        self.sync.mark_dirty(now);
    }

    pub fn delete_edge(&mut self, now: Instant, id: &str) {
        self.architecture.delete_edge(id);
        self.sync.mark_dirty(now);
    }

    pub fn update_node_data(&mut self, now: Instant, id: &str, patch: NodePatch) {
        self.architecture.update_node_data(id, patch);
        self.sync.mark_dirty(now);
    }

    /// Renames and flushes immediately instead of waiting out the debounce.
    pub fn rename_node(&mut self, now: Instant, id: &str, new_label: &str) {
        self.architecture.rename_node(id, new_label);
        let state = DocumentState::new(&self.architecture, self.mode, &self.overrides);
        self.sync.flush_rename(now, &self.store, &state);
    }

    /// Bulk import. The incoming document replaces everything and the whole
    /// board is re-laid out (pinned positions still win).
    pub fn replace_all(&mut self, now: Instant, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.architecture.replace_all(nodes, edges);
        self.refresh_layout();
        self.sync.mark_dirty(now);
    }

    pub fn set_mode(&mut self, now: Instant, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.refresh_layout();
        self.sync.mark_dirty(now);
    }

    /// Drag completion: the node keeps its dropped position and the spot is
    /// recorded as an override for the active orientation.
    pub fn pin_position(&mut self, now: Instant, id: &str, position: Point) {
        if !self.architecture.set_position(id, position) {
            return;
        }
        self.overrides.record(self.mode, id, position);
        self.sync.mark_dirty(now);
    }

    /// Drives the routine debounce; returns whether a flush happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let state = DocumentState::new(&self.architecture, self.mode, &self.overrides);
        self.sync.tick(now, &self.store, &state)
    }

    /// Explicit save: flushes the full state regardless of timers.
    pub fn sync_now(&mut self) {
        let state = DocumentState::new(&self.architecture, self.mode, &self.overrides);
        self.sync.flush_now(&self.store, &state);
    }

    fn refresh_layout(&mut self) {
        let result = layout::compute_layout(
            &self.architecture,
            self.mode,
            &self.overrides,
            &self.config.layout,
        );
        self.architecture
            .apply_positions(&result.positions, result.anchors);
    }

    fn refresh_if_flagged(&mut self) {
        if self.architecture.any_needs_layout() {
            self.refresh_layout();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Side;

    fn open_builder() -> (tempfile::TempDir, Builder) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocumentStore::open(&dir.path().join("board.redb")).expect("open store");
        (dir, Builder::open(store, Config::default()))
    }

    #[test]
    fn open_lays_out_the_bootstrap_document() {
        let (_dir, builder) = open_builder();
        let frontend = builder.architecture().node("frontend").unwrap();
        assert!(!frontend.needs_layout);
        // Leaves database/queue take lanes 0 and 1; the root centers at 0.5.
        assert_eq!(frontend.position, Point::new(40.0, 85.0));
        assert_eq!(frontend.anchors.input, Side::Left);
    }

    #[test]
    fn adding_a_node_triggers_exactly_one_relayout() {
        let (_dir, mut builder) = open_builder();
        let now = Instant::now();
        let id = builder.add_node(now, "Cache", NodeKind::Item, Some("service"), None);
        let node = builder.architecture().node(&id).unwrap();
        assert!(!node.needs_layout);
        assert_ne!(node.position, Point::default());
    }

    #[test]
    fn deleting_does_not_move_surviving_nodes() {
        let (_dir, mut builder) = open_builder();
        let now = Instant::now();
        let database = builder.architecture().node("database").unwrap().position;
        builder.delete_node(now, "queue");
        assert_eq!(
            builder.architecture().node("database").unwrap().position,
            database
        );
    }

    #[test]
    fn mode_round_trip_reproduces_the_pinned_position() {
        let (_dir, mut builder) = open_builder();
        let now = Instant::now();
        builder.pin_position(now, "gateway", Point::new(500.0, 500.0));
        assert_eq!(
            builder.architecture().node("gateway").unwrap().position,
            Point::new(500.0, 500.0)
        );

        builder.set_mode(now, LayoutMode::Vertical);
        let vertical = builder.architecture().node("gateway").unwrap().position;
        assert_ne!(vertical, Point::new(500.0, 500.0));
        assert_eq!(
            builder.architecture().node("gateway").unwrap().anchors.input,
            Side::Top
        );

        builder.set_mode(now, LayoutMode::Horizontal);
        assert_eq!(
            builder.architecture().node("gateway").unwrap().position,
            Point::new(500.0, 500.0)
        );
        assert_eq!(
            builder.overrides().get(LayoutMode::Horizontal, "gateway"),
            Some(Point::new(500.0, 500.0))
        );
        assert_eq!(builder.overrides().get(LayoutMode::Vertical, "gateway"), None);
    }

    #[test]
    fn rename_persists_without_waiting_for_tick() {
        let (_dir, mut builder) = open_builder();
        let now = Instant::now();
        builder.rename_node(now, "gateway", "Edge Gateway");

        let nodes: Vec<Node> = builder
            .store
            .read_namespace(crate::store::NODES_NAMESPACE)
            .unwrap();
        let gateway = nodes.into_iter().find(|n| n.id == "gateway").unwrap();
        assert_eq!(gateway.data.label, "Edge Gateway");
    }

    #[test]
    fn routine_mutations_persist_only_after_the_debounce() {
        let (_dir, mut builder) = open_builder();
        let t0 = Instant::now();
        builder.delete_node(t0, "queue");
        assert!(builder.is_syncing(t0));
        assert!(
            builder
                .store
                .read_namespace::<Vec<Node>>(crate::store::NODES_NAMESPACE)
                .is_none()
        );
        assert!(builder.tick(t0 + Config::default().sync.debounce()));
        let nodes: Vec<Node> = builder
            .store
            .read_namespace(crate::store::NODES_NAMESPACE)
            .unwrap();
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn replace_all_lays_out_the_imported_document() {
        let (_dir, mut builder) = open_builder();
        let now = Instant::now();
        let document = crate::defaults::default_document();
        let mut nodes = document.nodes;
        nodes.truncate(2);
        let edges = vec![document.edges[0].clone()];
        builder.replace_all(now, nodes, edges);

        assert_eq!(builder.architecture().nodes().len(), 2);
        let gateway = builder.architecture().node("gateway").unwrap();
        assert_ne!(gateway.position, Point::default());
        assert_eq!(builder.selected(), None);
    }
}
