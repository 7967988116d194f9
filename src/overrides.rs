//! Mode-scoped manual position overrides.
//!
//! A position pinned while one orientation is active has no effect on the
//! other orientation. Entries are never evicted; an override whose node is
//! gone is harmless and simply unused.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{LayoutMode, Point};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideMap {
    #[serde(default)]
    pub horizontal: BTreeMap<String, Point>,
    #[serde(default)]
    pub vertical: BTreeMap<String, Point>,
}

impl OverrideMap {
    pub fn for_mode(&self, mode: LayoutMode) -> &BTreeMap<String, Point> {
        match mode {
            LayoutMode::Horizontal => &self.horizontal,
            LayoutMode::Vertical => &self.vertical,
        }
    }

    fn for_mode_mut(&mut self, mode: LayoutMode) -> &mut BTreeMap<String, Point> {
        match mode {
            LayoutMode::Horizontal => &mut self.horizontal,
            LayoutMode::Vertical => &mut self.vertical,
        }
    }

    /// Upserts the final position of a completed drag.
    pub fn record(&mut self, mode: LayoutMode, id: &str, position: Point) {
        self.for_mode_mut(mode).insert(id.to_string(), position);
    }

    pub fn get(&self, mode: LayoutMode, id: &str) -> Option<Point> {
        self.for_mode(mode).get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }
}
