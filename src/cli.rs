use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use crate::builder::Builder;
use crate::config::load_config;
use crate::dump::render_dump;
use crate::model::{Edge, LayoutMode, Node, NodeKind, Point};
use crate::store::DocumentStore;

#[derive(Parser, Debug)]
#[command(name = "archboard", version, about = "Architecture board editor (headless core)")]
pub struct Args {
    /// Board database file
    #[arg(short = 's', long = "store", default_value = "archboard.redb")]
    pub store: PathBuf,

    /// Config JSON file overriding layout/sync constants
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the laid-out board as JSON
    Show,
    /// Add a node, optionally under a parent
    Add {
        label: String,
        #[arg(long, default_value = "item")]
        kind: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Connect two nodes with a directed edge
    Connect { source: String, target: String },
    /// Rename a node (flushes immediately)
    Rename { id: String, label: String },
    /// Remove nodes and every edge touching them
    Remove { ids: Vec<String> },
    /// Remove a single edge
    Unlink { edge: String },
    /// Pin a node at a position in the active orientation
    Pin { id: String, x: f64, y: f64 },
    /// Switch the layout orientation (horizontal | vertical)
    Mode { mode: String },
    /// Replace the whole document from a JSON file of nodes and edges
    Import { file: PathBuf },
    /// Write the current document to a JSON file
    Export { file: PathBuf },
}

#[derive(serde::Serialize, serde::Deserialize)]
struct DocumentFile {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

pub fn run() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let store = DocumentStore::open(&args.store)?;
    let mut builder = Builder::open(store, config);
    let now = Instant::now();

    match args.command {
        Command::Show => {
            println!("{}", render_dump(&builder)?);
            return Ok(());
        }
        Command::Export { file } => {
            let document = DocumentFile {
                nodes: builder.architecture().nodes().to_vec(),
                edges: builder.architecture().edges().to_vec(),
            };
            std::fs::write(file, serde_json::to_string_pretty(&document)?)?;
            return Ok(());
        }
        Command::Add {
            label,
            kind,
            parent,
            icon,
        } => {
            let kind = NodeKind::from_token(&kind)
                .ok_or_else(|| anyhow::anyhow!("unknown node kind: {kind}"))?;
            let id = builder.add_node(now, &label, kind, parent.as_deref(), icon.as_deref());
            println!("{id}");
        }
        Command::Connect { source, target } => {
            let id = builder.connect(now, &source, &target);
            println!("{id}");
        }
        Command::Rename { id, label } => {
            builder.rename_node(now, &id, &label);
        }
        Command::Remove { ids } => {
            builder.delete_nodes(now, &ids);
        }
        Command::Unlink { edge } => {
            builder.delete_edge(now, &edge);
        }
        Command::Pin { id, x, y } => {
            builder.pin_position(now, &id, Point::new(x, y));
        }
        Command::Mode { mode } => {
            let mode = LayoutMode::from_token(&mode)
                .ok_or_else(|| anyhow::anyhow!("unknown layout mode: {mode}"))?;
            builder.set_mode(now, mode);
        }
        Command::Import { file } => {
            let contents = std::fs::read_to_string(file)?;
            let document: DocumentFile = serde_json::from_str(&contents)?;
            builder.replace_all(now, document.nodes, document.edges);
        }
    }

    // One-shot process: persist before exit instead of waiting out the
    // debounce window.
    builder.sync_now();
    Ok(())
}
