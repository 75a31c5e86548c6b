use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use linegraph::render::svg::write_svg;
use linegraph::{render, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "linegraph",
    version,
    about = "Render time-series monitoring scenes as SVG line graphs"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON scene (graph config + item history) to SVG.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Scene file: `{"graph": {...}, "items": {"<item>": {"samples": [[clock, value], ...]}}}`
    #[arg(short, long)]
    scene: PathBuf,
    /// Output SVG path.
    #[arg(short, long)]
    out: PathBuf,
    /// Also dump the primitive stream, axes and time grid as JSON.
    #[arg(long)]
    dump: Option<PathBuf>,
    /// Override the window start (unix seconds).
    #[arg(long)]
    from: Option<i64>,
    /// Override the window length in seconds.
    #[arg(long)]
    period: Option<i64>,
    /// Override the outer width.
    #[arg(long)]
    width: Option<u32>,
    /// Override the outer height.
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let (mut config, source) = storage::load_scene(&args.scene)?.into_parts();
    if let Some(from) = args.from {
        config.from = Some(from);
    }
    if let Some(period) = args.period {
        config.period = period;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    let graph = render::render(&config, &source, &source)?;
    write_svg(&graph, &args.out)?;
    eprintln!(
        "Wrote {}x{} graph ({} primitives) to {}",
        graph.width,
        graph.height,
        graph.primitives().count(),
        args.out.display()
    );

    if let Some(path) = args.dump.as_ref() {
        storage::save_rendered_json(&graph, path)?;
        eprintln!("Saved primitives to {}", path.display());
    }
    Ok(())
}
