use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use genoview::compose::TrackComposer;
use genoview::config::LayoutConfig;
use genoview::region::GenomicRegion;
use genoview::source::TrackDocument;
use genoview::viewer::App;
use genoview::viewport::{generate_ticks, ViewportController};

#[derive(Parser)]
#[command(
    name = "genoview",
    about = "Genomic multi-track viewer: interval-packed layout over a pan/zoom viewport",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive TUI viewer over a track document
    View {
        /// Path to a JSON track document
        #[arg(short, long)]
        tracks: PathBuf,

        /// Region to open (format: chr:start-end); defaults to the
        /// document's region
        #[arg(short = 'L', long)]
        region: Option<String>,

        /// Session file to restore from and save to with 's'
        #[arg(short, long)]
        session: Option<PathBuf>,
    },

    /// Lay a document out against a region and print per-track statistics
    Layout {
        /// Path to a JSON track document
        #[arg(short, long)]
        tracks: PathBuf,

        /// Region to lay out (format: chr:start-end)
        #[arg(short = 'L', long)]
        region: Option<String>,

        /// Viewport width in pixels
        #[arg(short, long, default_value = "1000")]
        width: f64,

        /// Dump the full draw-command lists as JSON
        #[arg(long)]
        dump: bool,
    },

    /// Print the axis ticks chosen for a region
    Ticks {
        /// Region (format: chr:start-end)
        #[arg(short = 'L', long)]
        region: String,

        /// Viewport width in pixels
        #[arg(short, long, default_value = "1000")]
        width: f64,

        /// Target number of major ticks
        #[arg(short, long, default_value = "10")]
        target: usize,
    },
}

fn resolve_region(doc: &TrackDocument, arg: Option<&str>) -> Result<GenomicRegion> {
    if let Some(arg) = arg {
        return arg.parse().context("failed to parse region");
    }
    doc.region()?
        .context("no region given and the track document has none")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::View {
            tracks,
            region,
            session,
        } => {
            let doc = TrackDocument::from_path(&tracks)?;
            let region = resolve_region(&doc, region.as_deref())?;
            let cfg = LayoutConfig::terminal();
            let built = doc.build_tracks(&cfg);

            let mut app = App::new(doc.genome(), region, built, cfg, session)?;
            app.run_tui()?;
        }

        Commands::Layout {
            tracks,
            region,
            width,
            dump,
        } => {
            let doc = TrackDocument::from_path(&tracks)?;
            let region = resolve_region(&doc, region.as_deref())?;
            let cfg = LayoutConfig::default();

            let controller = ViewportController::new(doc.genome(), region, width, &cfg)?;
            let mut composer = TrackComposer::new(cfg.clone());
            for track in doc.build_tracks(&cfg) {
                composer.add_track(track)?;
            }

            let viewport = controller.viewport();
            composer.layout_all(&viewport);

            println!(
                "Region {} ({} bp) at {:.0} px, {:.4} px/bp",
                viewport.region,
                viewport.region.span(),
                viewport.pixel_width,
                viewport.scale()
            );
            println!(
                "{:<16} {:<12} {:>9} {:>9} {:>9} {:>9}",
                "Track", "Kind", "Features", "Commands", "Rows", "Overflow"
            );
            println!("{}", "-".repeat(68));
            for track in composer.tracks() {
                let rows = (0..track.payload().len())
                    .filter_map(|i| track.row_of(i))
                    .max()
                    .map(|r| r + 1)
                    .unwrap_or(0);
                println!(
                    "{:<16} {:<12} {:>9} {:>9} {:>9} {:>9}",
                    track.id,
                    track.kind().to_string(),
                    track.payload().len(),
                    track.commands().len(),
                    rows,
                    track.overflow()
                );
            }
            println!("Canvas height: {:.0} px", composer.total_height());

            if dump {
                for track in composer.tracks() {
                    println!("{}", track.id);
                    println!("{}", serde_json::to_string_pretty(track.commands())?);
                }
            }
        }

        Commands::Ticks {
            region,
            width,
            target,
        } => {
            let region: GenomicRegion = region.parse().context("failed to parse region")?;
            let viewport = genoview::viewport::Viewport {
                region,
                pixel_width: width,
                generation: 0,
            };

            println!("{:<14} {:>10} {:>8}  {}", "Position", "Pixel", "Major", "Label");
            for tick in generate_ticks(&viewport, target) {
                println!(
                    "{:<14} {:>10.1} {:>8}  {}",
                    tick.position,
                    tick.pixel,
                    if tick.major { "yes" } else { "" },
                    tick.label.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
