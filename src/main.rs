mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use node_weaver::session::attribute_choice;
use node_weaver::{Session, Settings, dataset, export};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON settings file; missing fields take their defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// JSON array of `{ "name": ..., "properties": { ... } }` to start from instead of the
    /// built-in sample people.
    #[arg(long)]
    nodes: Option<PathBuf>,

    /// Seed for topology generation and node placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Attribute that drives clustering, or `none`.
    #[arg(long, default_value = "team")]
    cluster_by: String,

    /// Attribute that drives node color, or `none`.
    #[arg(long, default_value = "city")]
    color_by: String,

    #[arg(long, default_value = "graph.json")]
    export_json: PathBuf,

    #[arg(long, default_value = "graph.csv")]
    export_csv: PathBuf,

    /// Generate, simulate, export and exit without opening a window.
    #[arg(long)]
    headless: bool,

    /// Simulation ticks to run before exporting in headless mode.
    #[arg(long, default_value_t = 0)]
    ticks: u32,
}

fn build_session(args: &Args) -> Result<Session> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let people = match &args.nodes {
        Some(path) => dataset::load_nodes(path)
            .with_context(|| format!("failed to load nodes from {}", path.display()))?,
        None => dataset::sample_people(),
    };

    let mut session = Session::seeded(settings, args.seed);
    session.set_cluster_by(attribute_choice(&args.cluster_by));
    session.set_color_by(attribute_choice(&args.color_by));
    let report = session.populate(people);
    info!(
        nodes = session.graph().node_count(),
        edges = report.total_edges(),
        under_connected = report.under_connected,
        "session ready"
    );
    Ok(session)
}

fn run_headless(mut session: Session, args: &Args) -> Result<()> {
    let mut settled_at = None;
    for tick in 0..args.ticks {
        if !session.tick() && settled_at.is_none() {
            settled_at = Some(tick);
        }
    }
    info!(ticks = args.ticks, ?settled_at, "simulation finished");

    export::write_json(session.graph(), &args.export_json)
        .with_context(|| format!("failed to write {}", args.export_json.display()))?;
    export::write_csv(session.graph(), &args.export_csv)
        .with_context(|| format!("failed to write {}", args.export_csv.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let session = build_session(&args)?;

    if args.headless {
        return run_headless(session, &args);
    }

    let exports = app::ExportPaths {
        json: args.export_json.clone(),
        csv: args.export_csv.clone(),
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "node-weaver",
        options,
        Box::new(move |cc| Ok(Box::new(app::NodeWeaverApp::new(cc, session, exports)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the editor window: {err}"))
}
