use anyhow::{Context, Result};
use aquifer_plot::{Config, Dataset, archive, pipeline, storage};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "aquifer-plot",
    version,
    about = "Map major aquifer regions and chart their groundwater depletion"
)]
struct Cli {
    /// JSON config file (missing fields use the built-in defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON dataset replacing the built-in region and depletion tables.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the archive, render the map, then render the chart.
    Run(RenderArgs),
    /// Extract the archive and print the shapefile it contains.
    Resolve,
    /// Render only the map.
    Map(MapArgs),
    /// Render only the depletion chart.
    Chart(RenderArgs),
    /// Write the depletion table to a file.
    Export(ExportArgs),
    /// Print the effective configuration as JSON.
    Config,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output resolution for the rendered figures (default 900).
    #[arg(long)]
    dpi: Option<f64>,
    /// Output path (.png or .svg); overrides the configured one.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Open each saved figure in the system image viewer.
    #[arg(long)]
    show: bool,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Use this shapefile directly instead of extracting the archive.
    #[arg(long)]
    shapefile: Option<PathBuf>,
    #[command(flatten)]
    render: RenderArgs,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Destination file.
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = &cli.dataset {
        config.dataset = Some(path.clone());
    }

    match cli.cmd {
        Command::Run(args) => cmd_run(config, args),
        Command::Resolve => cmd_resolve(&config),
        Command::Map(args) => cmd_map(config, args),
        Command::Chart(args) => cmd_chart(config, args),
        Command::Export(args) => cmd_export(&config, args),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn apply_dpi(config: Config, dpi: Option<f64>) -> Result<Config> {
    let config = match dpi {
        Some(d) => config.with_dpi(d),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

fn load_dataset(config: &Config) -> Result<Dataset> {
    config.dataset().context("failed to load dataset")
}

fn cmd_run(config: Config, args: RenderArgs) -> Result<()> {
    if args.out.is_some() {
        anyhow::bail!("--out is not supported by `run`; set paths in the config instead");
    }
    let config = apply_dpi(config, args.dpi)?;
    let dataset = load_dataset(&config)?;
    let summary = pipeline::run(&config, &dataset)?;
    println!("Map saved successfully at: {}", summary.map.display());
    if args.show {
        show_all(&[summary.map.as_path(), summary.chart.as_path()]);
    }
    Ok(())
}

/// A viewer that fails to start does not undo the saved figures; warn and go on.
fn show_all(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = pipeline::show(path) {
            log::warn!("{}", e);
        }
    }
}

fn cmd_resolve(config: &Config) -> Result<()> {
    let search = archive::resolve_shapefile(&config.paths.archive, &config.paths.extract_dir)
        .with_context(|| format!("failed to extract {}", config.paths.archive.display()))?;
    match search.shapefile {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!(
            "no .shp file found in {}",
            config.paths.extract_dir.display()
        ),
    }
    Ok(())
}

fn cmd_map(config: Config, args: MapArgs) -> Result<()> {
    let config = apply_dpi(config, args.render.dpi)?;
    let dataset = load_dataset(&config)?;
    let shapefile = match args.shapefile {
        Some(p) => p,
        None => pipeline::resolve(&config)?,
    };
    let out = args.render.out.unwrap_or_else(|| config.paths.map_output.clone());
    pipeline::render_map(&config, &dataset, &shapefile, &out)
        .with_context(|| format!("failed to render map from {}", shapefile.display()))?;
    println!("Map saved successfully at: {}", out.display());
    if args.render.show {
        show_all(&[out.as_path()]);
    }
    Ok(())
}

fn cmd_chart(config: Config, args: RenderArgs) -> Result<()> {
    let config = apply_dpi(config, args.dpi)?;
    let dataset = load_dataset(&config)?;
    let out = args.out.unwrap_or_else(|| config.paths.chart_output.clone());
    pipeline::render_chart(&config, &dataset, &out).context("failed to render chart")?;
    println!("Chart saved successfully at: {}", out.display());
    if args.show {
        show_all(&[out.as_path()]);
    }
    Ok(())
}

fn cmd_export(config: &Config, args: ExportArgs) -> Result<()> {
    let records = load_dataset(config)?.depletion.records()?;
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => args.out.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(&records, &args.out)?,
        "json" => storage::save_json(&records, &args.out)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", records.len(), args.out.display());
    Ok(())
}
