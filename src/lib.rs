pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod dump;
pub mod icons;
pub mod layout;
pub mod model;
pub mod overrides;
pub mod store;
pub mod sync;

pub use builder::Builder;
pub use config::{Config, LayoutConfig, SyncConfig, load_config};
pub use layout::{LayoutResult, compute_layout};
pub use model::{
    Anchors, Architecture, Edge, LayoutMode, Node, NodeData, NodeKind, NodePatch, Point, Side,
};
pub use overrides::OverrideMap;
pub use store::{DocumentStore, StoreError};
pub use sync::{DocumentState, LoadedDocument, SyncService, load_document};

#[cfg(feature = "cli")]
pub use cli::run;
