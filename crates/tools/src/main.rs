use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, Subcommand};
use layers::{IdentityProjector, LayerId, OverlayLayer, PointerEvent, PointerEventKind, WellboreLayer};
use runtime::FrameBudget;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wellbores::{HighlightEvent, SourceData, WellboreConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect wellbore overlays built from JSON records")]
struct Args {
    /// Wellbore config as JSON; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move the pointer to (x, y) and print the highlight event
    Probe {
        wells: PathBuf,
        x: f64,
        y: f64,

        /// Zoom level applied before probing
        #[arg(long, default_value_t = 20.0)]
        zoom: f64,
    },

    /// Print vertex and triangle counts per wellbore
    Mesh { wells: PathBuf },
}

#[derive(Serialize, Debug)]
struct MeshSummary<'a> {
    label: &'a str,
    group: &'a str,
    root: usize,
    vertices: usize,
    triangles: usize,
    single_point: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))?
        }
        None => WellboreConfig::default(),
    };

    match args.command {
        Command::Probe { wells, x, y, zoom } => cmd_probe(&wells, config, [x, y], zoom),
        Command::Mesh { wells } => cmd_mesh(&wells, config),
    }
}

fn load(path: &Path, config: WellboreConfig) -> Result<WellboreLayer, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let wells: Vec<SourceData> =
        serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))?;
    let count = wells.len();

    let mut layer = WellboreLayer::new(LayerId(0), config)
        .map_err(|e| format!("layer: {e}"))?
        .with_projector(IdentityProjector);
    layer.set(wells, "default").map_err(|e| format!("load: {e}"))?;
    let mut ticks = 0;
    while layer.is_loading() {
        layer.tick(&mut FrameBudget::new(1));
        ticks += 1;
    }
    info!(
        records = count,
        wellbores = layer.store().wellbore_count(),
        roots = layer.store().root_count(),
        ticks,
        "loaded wells"
    );
    Ok(layer)
}

fn cmd_probe(path: &Path, config: WellboreConfig, position: [f64; 2], zoom: f64) -> Result<(), String> {
    let mut layer = load(path, config)?;
    layer.resize(zoom);

    let seen: Rc<RefCell<Option<HighlightEvent>>> = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    layer.on_highlight_on(move |e| *sink.borrow_mut() = Some(e.clone()));

    let hit = layer.handle_pointer(&PointerEvent::new(PointerEventKind::Move, position));
    info!(x = position[0], y = position[1], hit, "probed");

    let event = seen.borrow().clone();
    let payload = serde_json::to_string_pretty(&event).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn cmd_mesh(path: &Path, config: WellboreConfig) -> Result<(), String> {
    let layer = load(path, config)?;
    let store = layer.store();
    let summaries: Vec<MeshSummary<'_>> = store
        .wellbores()
        .map(|(_, w)| MeshSummary {
            label: &w.data.label,
            group: store.group(w.group).map_or("", |g| g.key.as_str()),
            root: w.root.0,
            vertices: w.mesh().map_or(0, |m| m.vertex_count()),
            triangles: w.mesh().map_or(0, |m| m.triangle_count()),
            single_point: w.interpolator.is_single_point(),
        })
        .collect();
    let payload = serde_json::to_string_pretty(&summaries).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}
