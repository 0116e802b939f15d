use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use trihedral::core::{resolve_file, DimensionParams, RigConfig, DEFAULT_DIMENSIONS_FILE};
use trihedral::export::GlbWriter;
use trihedral::rig::{MarkerId, MarkerImages, DEFAULT_PX_PER_SQUARE};
use trihedral::{
    build_rig, export, load_parts, reconstruct_rig, reconstruction_scene, rig_scene,
    write_report, BuildOptions, BuildReport, ReconstructReport,
};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

#[derive(Debug, Parser)]
#[command(
    name = "trihedral",
    about = "Generate trihedral calibration rigs as glTF binaries",
    version
)]
struct Cli {
    /// Log filter for stderr output.
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    /// Emit JSON log lines (requires the `tracing` feature).
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the merged dimension set as an override document.
    Resolve(ResolveArgs),
    /// Build the rig from dimensions and export it.
    Build(BuildArgs),
    /// Classify prebuilt parts, place markers and export.
    Reconstruct(ReconstructArgs),
}

#[derive(Debug, Args)]
struct DimensionsArg {
    /// Override document; a missing file means defaults.
    #[arg(long, default_value = DEFAULT_DIMENSIONS_FILE)]
    dimensions: PathBuf,
}

#[derive(Debug, Args)]
struct MarkerArgs {
    /// Directory holding `ArucoMarker<id>.png`.
    #[arg(long)]
    markers: PathBuf,

    /// JSON object mapping marker ids to image paths relative to `--markers`.
    #[arg(long)]
    marker_map: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    #[command(flatten)]
    dims: DimensionsArg,
}

#[derive(Debug, Args)]
struct BuildArgs {
    #[command(flatten)]
    dims: DimensionsArg,

    #[command(flatten)]
    markers: MarkerArgs,

    /// Output `.glb` path.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON summary.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Baked checker texture density.
    #[arg(long, default_value_t = DEFAULT_PX_PER_SQUARE)]
    px_per_square: u32,
}

#[derive(Debug, Args)]
struct ReconstructArgs {
    /// Part bounds as JSON.
    #[arg(long)]
    parts: PathBuf,

    #[command(flatten)]
    dims: DimensionsArg,

    #[command(flatten)]
    markers: MarkerArgs,

    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Resolve(args) => {
            let config = resolve(&args.dims)?;
            print!("{}", config.to_override_doc());
        }
        Commands::Build(args) => run_build(args)?,
        Commands::Reconstruct(args) => run_reconstruct(args)?,
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        log::set_max_level(cli.log_level);
        trihedral::core::init_tracing(cli.log_json);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = trihedral::core::init_with_level(cli.log_level);
    }
}

fn resolve(dims: &DimensionsArg) -> Result<RigConfig, Box<dyn Error>> {
    let resolved = resolve_file(&DimensionParams::default(), &dims.dimensions)?;
    if !resolved.warnings.is_empty() {
        log::warn!("{} warning(s) while resolving dimensions", resolved.warnings.len());
    }
    Ok(resolved.config)
}

fn marker_images(args: &MarkerArgs) -> Result<MarkerImages, Box<dyn Error>> {
    let mut images = MarkerImages::new(&args.markers);
    if let Some(path) = &args.marker_map {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("failed to read marker map {}: {e}", path.display()))?;
        let map: BTreeMap<MarkerId, PathBuf> = serde_json::from_str(&text)
            .map_err(|e| format!("invalid marker map {}: {e}", path.display()))?;
        for (id, image) in map {
            images = images.with_override(id, image);
        }
    }
    Ok(images)
}

fn run_build(args: BuildArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve(&args.dims)?;
    let images = marker_images(&args.markers)?;
    let build = build_rig(&config, &images)?;
    let scene = rig_scene(
        &build,
        &BuildOptions {
            px_per_square: args.px_per_square,
        },
    )?;
    export(&scene, &GlbWriter::default(), &args.out)?;
    if let Some(path) = &args.report {
        write_report(&BuildReport::new(&build, &scene, &args.out), path)?;
    }
    println!("wrote {}", args.out.display());
    Ok(())
}

fn run_reconstruct(args: ReconstructArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve(&args.dims)?;
    let images = marker_images(&args.markers)?;
    let doc = load_parts(&args.parts)?;
    let parts = doc.bounds()?;
    let rec = reconstruct_rig(&parts, &doc.params, &config.pattern, &images)?;
    let scene = reconstruction_scene(&rec)?;
    export(&scene, &GlbWriter::default(), &args.out)?;
    if let Some(path) = &args.report {
        write_report(&ReconstructReport::new(&rec, &scene, &args.out), path)?;
    }
    println!("wrote {}", args.out.display());
    Ok(())
}
