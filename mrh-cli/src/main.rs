use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

mod commands;
mod config;
mod dataset;
mod error;

use commands::ViewSelection;
use config::{Config, RenderOverrides};
use error::CliError;

#[derive(Parser)]
#[command(name = "mrh")]
#[command(about = "MRH - Progressive multi-resolution heatmap viewer")]
#[command(version)]
#[command(long_about = "
MRH draws genomic contact heatmaps progressively, coarse layers first, and
keeps the view, the form fields and the shareable link in sync.

Examples:
  mrh render --dataset contacts.json --out view.png --view 'chr1:0-1M'
  mrh render --dataset contacts.json --out view.svg --link 'http://host/mrh?dataset_id=...'
  mrh replay --dataset contacts.json --script session.json --out final.png
  mrh pattern --out pattern.png --min-color 0000ff --max-color ff0000
  mrh chroms --dataset contacts.json --controls
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one view of a dataset to PNG or SVG
    Render {
        /// Dataset file (JSON)
        #[arg(long, required = true)]
        dataset: PathBuf,

        /// Output file (PNG/SVG, by extension)
        #[arg(short, long, required = true)]
        out: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        canvas: CanvasArgs,

        /// Page URL the shareable link is built on
        #[arg(long, default_value = "http://localhost/mrh")]
        base_url: String,
    },

    /// Replay a timed pointer/form script and render the final view
    Replay {
        /// Dataset file (JSON)
        #[arg(long, required = true)]
        dataset: PathBuf,

        /// Script file (JSON array of timed steps)
        #[arg(long, required = true)]
        script: PathBuf,

        /// Output file (PNG/SVG, by extension)
        #[arg(short, long, required = true)]
        out: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        canvas: CanvasArgs,

        /// Page URL the shareable link is built on
        #[arg(long, default_value = "http://localhost/mrh")]
        base_url: String,

        /// Delay every layer response by this many milliseconds
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },

    /// Render the four-quadrant test pattern
    Pattern {
        /// Take chromosome headers from this dataset
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Output file (PNG/SVG, by extension)
        #[arg(short, long, required = true)]
        out: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        canvas: CanvasArgs,
    },

    /// List a dataset's chromosomes
    Chroms {
        /// Dataset file (JSON)
        #[arg(long, required = true)]
        dataset: PathBuf,

        /// Print the form control descriptors for the default view instead
        #[arg(long)]
        controls: bool,
    },

    /// Write a configuration file with every default filled in
    InitConfig {
        /// Output path, or '-' for stdout
        #[arg(default_value = "mrh.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct ViewArgs {
    /// Region to show (e.g. 'chr1:0-1M' or 'chr1:0-1M vs chr2:0-1M')
    #[arg(long)]
    view: Option<String>,

    /// Shared link or query string to restore; wins over --view
    #[arg(long)]
    link: Option<String>,
}

impl From<ViewArgs> for ViewSelection {
    fn from(args: ViewArgs) -> Self {
        ViewSelection {
            link: args.link,
            view: args.view,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct CanvasArgs {
    /// Width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Hex color for the lowest score
    #[arg(long)]
    min_color: Option<String>,

    /// Hex color for the highest score
    #[arg(long)]
    max_color: Option<String>,
}

impl From<CanvasArgs> for RenderOverrides {
    fn from(args: CanvasArgs) -> Self {
        RenderOverrides {
            width: args.width,
            height: args.height,
            min_color: args.min_color,
            max_color: args.max_color,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { dataset, out, view, canvas, base_url } => {
            let link = commands::render::execute(
                &config,
                commands::render::RenderArgs {
                    dataset,
                    output: out,
                    selection: view.into(),
                    overrides: canvas.into(),
                    base_url,
                },
            )?;
            if let Some(link) = link {
                println!("{}", link);
            }
        }

        Commands::Replay { dataset, script, out, view, canvas, base_url, latency_ms } => {
            let report = commands::replay::execute(
                &config,
                commands::replay::ReplayArgs {
                    dataset,
                    script,
                    output: out,
                    selection: view.into(),
                    overrides: canvas.into(),
                    base_url,
                    latency_ms,
                },
            )?;
            let vp = &report.viewport;
            log::info!(
                "{} passes ({} superseded layers), final view {}:{}-{} vs {}:{}-{}",
                report.passes,
                report.summary.stale,
                vp.chrom1,
                vp.start1,
                vp.stop1,
                vp.chrom2,
                vp.start2,
                vp.stop2
            );
            if let Some(link) = report.link {
                println!("{}", link);
            }
        }

        Commands::Pattern { dataset, out, view, canvas } => {
            commands::pattern::execute(
                &config,
                commands::pattern::PatternArgs {
                    dataset,
                    output: out,
                    selection: view.into(),
                    overrides: canvas.into(),
                },
            )?;
        }

        Commands::Chroms { dataset, controls } => {
            println!("{}", commands::chroms::execute(&config, &dataset, controls)?);
        }

        Commands::InitConfig { output, force } => {
            if output.as_os_str() == "-" {
                print!("{}", Config::example_toml()?);
                return Ok(());
            }
            if output.exists() && !force {
                return Err(CliError::config(format!(
                    "{} already exists (use --force to overwrite)",
                    output.display()
                ))
                .into());
            }
            Config::default().save_to_file(&output)?;
            log::info!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            error::print_error_and_exit(cli_err);
        }
        return Err(err);
    }
    Ok(())
}
