use std::path::PathBuf;

use clap::Parser;
use drop_tower_k::config::{ConversionConfig, Overrides};
use drop_tower_k::convert;
use drop_tower_k::model::MotionType;
use drop_tower_k::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;

    if !cli.input.exists() {
        return Err(ToolError::MissingInput(cli.input));
    }

    let config = cli.resolve_config()?;
    info!(input = %cli.input.display(), "creating acceleration file");
    let report = convert::workbook_to_keyword(&cli.input, cli.rigid_body_id, &config)?;
    info!(
        output = %report.keyword_file.display(),
        samples = report.samples,
        end_time = report.end_time,
        figures = report.figures.len(),
        "conversion finished"
    );
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert drop tower acceleration workbooks into LS-DYNA prescribed motion curves."
)]
struct Cli {
    /// Drop tower workbook (.xlsx) holding the acceleration columns.
    input: PathBuf,

    /// Rigid body (centre of gravity part) receiving the prescribed motion.
    rigid_body_id: u32,

    /// Keyword file to write [default: acceleration.k].
    #[arg(long)]
    output: Option<PathBuf>,

    /// Factor applied to the linear acceleration values.
    #[arg(long)]
    linear_scale: Option<f64>,

    /// Factor applied to the rotational acceleration values.
    #[arg(long)]
    rotational_scale: Option<f64>,

    /// Motion type written for the rotational curves.
    #[arg(long, value_enum)]
    rotational_motion: Option<MotionType>,

    /// Skip rendering the diagnostic figures.
    #[arg(long)]
    no_plot: bool,

    /// Directory receiving acc.svg and acc.png.
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Optional JSON configuration; flags take precedence over its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn resolve_config(&self) -> Result<ConversionConfig> {
        let overrides = Overrides {
            output: self.output.clone(),
            linear_scale: self.linear_scale,
            rotational_scale: self.rotational_scale,
            rotational_motion: self.rotational_motion,
            no_plot: self.no_plot,
            plot_dir: self.plot_dir.clone(),
        };
        ConversionConfig::resolve(self.config.as_deref(), &overrides)
    }
}
