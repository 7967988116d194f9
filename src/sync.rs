//! Debounced persistence and startup rehydration.
//!
//! Every flush re-serializes the complete current state of all four
//! namespaces, never a delta. That full-rewrite policy is what makes the
//! two independent timing windows (routine debounce, rename indicator)
//! safe to race: either ordering converges to the same persisted state.
//! A failed durable write is logged and swallowed; there is no retry.
//!
//! Timing is clock-injected: callers pass `Instant`s in, nothing here
//! reads the wall clock, so the debounce contract is directly testable.

use log::warn;
use std::time::Instant;

use crate::config::SyncConfig;
use crate::defaults;
use crate::model::{Architecture, Edge, LayoutMode, Node};
use crate::overrides::OverrideMap;
use crate::store::{
    DocumentStore, EDGES_NAMESPACE, MODE_NAMESPACE, NODES_NAMESPACE, OVERRIDES_NAMESPACE,
};

/// Borrowed view of everything a flush serializes.
pub struct DocumentState<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub mode: LayoutMode,
    pub overrides: &'a OverrideMap,
}

impl<'a> DocumentState<'a> {
    pub fn new(arch: &'a Architecture, mode: LayoutMode, overrides: &'a OverrideMap) -> Self {
        Self {
            nodes: arch.nodes(),
            edges: arch.edges(),
            mode,
            overrides,
        }
    }
}

pub struct SyncService {
    config: SyncConfig,
    flush_deadline: Option<Instant>,
    indicator_until: Option<Instant>,
}

impl SyncService {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            flush_deadline: None,
            indicator_until: None,
        }
    }

    /// Arms (or re-arms) the routine debounce window. Every further
    /// mutation pushes the deadline out again.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.flush_deadline = Some(now + self.config.debounce());
    }

    /// Flushes if the routine deadline has passed. Returns whether a flush
    /// happened.
    pub fn tick(&mut self, now: Instant, store: &DocumentStore, state: &DocumentState<'_>) -> bool {
        match self.flush_deadline {
            Some(deadline) if deadline <= now => {
                self.flush_deadline = None;
                self.flush(store, state);
                true
            }
            _ => false,
        }
    }

    /// Immediate flush for renames, on its own shorter indicator window.
    /// Any armed routine deadline stays armed; the eventual second flush
    /// rewrites the same full state.
    pub fn flush_rename(&mut self, now: Instant, store: &DocumentStore, state: &DocumentState<'_>) {
        self.flush(store, state);
        let until = now + self.config.rename_indicator();
        self.indicator_until = match self.indicator_until {
            Some(existing) if existing > until => Some(existing),
            _ => Some(until),
        };
    }

    /// Unconditional flush, used at teardown and by explicit save actions.
    pub fn flush_now(&mut self, store: &DocumentStore, state: &DocumentState<'_>) {
        self.flush_deadline = None;
        self.flush(store, state);
    }

    /// The sync indicator: a flush is pending or an indicator window is
    /// still open.
    pub fn is_syncing(&self, now: Instant) -> bool {
        self.flush_deadline.is_some() || self.indicator_until.is_some_and(|until| now < until)
    }

    fn flush(&self, store: &DocumentStore, state: &DocumentState<'_>) {
        let entries = [
            (NODES_NAMESPACE, serde_json::to_string(&state.nodes)),
            (EDGES_NAMESPACE, serde_json::to_string(&state.edges)),
            (MODE_NAMESPACE, serde_json::to_string(&state.mode)),
            (OVERRIDES_NAMESPACE, serde_json::to_string(&state.overrides)),
        ];
        let mut batch = Vec::with_capacity(entries.len());
        for (namespace, json) in entries {
            match json {
                Ok(json) => batch.push((namespace, json)),
                Err(err) => {
                    warn!("skipping namespace {namespace}, serialization failed: {err}");
                }
            }
        }
        if let Err(err) = store.write_namespaces(&batch) {
            warn!("durable write failed, continuing without retry: {err}");
        }
    }
}

pub struct LoadedDocument {
    pub architecture: Architecture,
    pub mode: LayoutMode,
    pub overrides: OverrideMap,
}

/// Rehydrates all namespaces, one at a time, before first interaction.
///
/// Each namespace is read independently; one that is absent or malformed
/// falls back on its own without blocking the rest. Nodes default to the
/// bootstrap document's nodes, edges to the bootstrap edges when the nodes
/// also defaulted and to an empty set otherwise, mode to horizontal,
/// overrides to empty. Icon names resolve to glyphs here, at the load
/// boundary.
pub fn load_document(store: &DocumentStore) -> LoadedDocument {
    let persisted_nodes: Option<Vec<Node>> = store.read_namespace(NODES_NAMESPACE);
    let persisted_edges: Option<Vec<Edge>> = store.read_namespace(EDGES_NAMESPACE);
    let (nodes, edges) = match (persisted_nodes, persisted_edges) {
        (Some(nodes), edges) => (nodes, edges.unwrap_or_default()),
        (None, edges) => {
            let document = defaults::default_document();
            (document.nodes, edges.unwrap_or(document.edges))
        }
    };
    let mode = store
        .read_namespace(MODE_NAMESPACE)
        .unwrap_or(LayoutMode::Horizontal);
    let overrides = store
        .read_namespace(OVERRIDES_NAMESPACE)
        .unwrap_or_default();
    LoadedDocument {
        architecture: Architecture::from_parts(nodes, edges),
        mode,
        overrides,
    }
}
