//! Symbolic icon names and their renderable glyphs.
//!
//! Persisted documents only ever carry icon *names*; the glyph side of the
//! table is resolved at load and import boundaries so that durable state
//! never holds a renderable handle.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::model::NodeKind;

/// Renderable form of an icon: the symbolic name plus the glyph a canvas
/// or terminal front end draws for it.
#[derive(Debug, PartialEq, Eq)]
pub struct IconGlyph {
    pub name: &'static str,
    pub symbol: char,
}

const ICONS: &[IconGlyph] = &[
    IconGlyph { name: "Globe", symbol: '🌐' },
    IconGlyph { name: "FileCode", symbol: '📄' },
    IconGlyph { name: "Layers", symbol: '🗂' },
    IconGlyph { name: "Cpu", symbol: '⚙' },
    IconGlyph { name: "Server", symbol: '🖥' },
    IconGlyph { name: "Database", symbol: '🛢' },
    IconGlyph { name: "Cloud", symbol: '☁' },
    IconGlyph { name: "GitBranch", symbol: '🔀' },
    IconGlyph { name: "Folder", symbol: '📁' },
    IconGlyph { name: "MessageSquare", symbol: '💬' },
];

static BY_NAME: Lazy<HashMap<&'static str, &'static IconGlyph>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for icon in ICONS {
        map.insert(icon.name, icon);
    }
    map
});

pub fn lookup(name: &str) -> Option<&'static IconGlyph> {
    BY_NAME.get(name).copied()
}

/// Symbolic name assigned when a node is created without an explicit icon.
pub fn default_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Group => "Folder",
        NodeKind::Item => "FileCode",
    }
}

/// Resolves a symbolic name into its glyph. Unknown names fall back to the
/// kind-appropriate default rather than failing.
pub fn resolve(name: &str, kind: NodeKind) -> &'static IconGlyph {
    if let Some(icon) = lookup(name) {
        return icon;
    }
    lookup(default_name(kind)).unwrap_or(&ICONS[1])
}

/// Glyph used for nodes that have not passed through a resolve boundary yet.
pub(crate) fn placeholder() -> &'static IconGlyph {
    &ICONS[1]
}
