use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sloperkit::{assemble, init_logging, run_pipeline, Drawing, RenderConfig};
use tracing::info;

/// Digitize a parsed CAD pattern drawing into piece images and a sloper
/// manifest.
#[derive(Parser)]
#[command(version, about, long_version = concat!(
    env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"
))]
struct Args {
    /// Drawing JSON produced by the format parser.
    input: PathBuf,

    /// Output directory for the manifest and piece images.
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Optional TOML render configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    config.validate()?;

    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let drawing = Drawing::from_json_bytes(&bytes)?;
    info!(
        "Loaded drawing with {} entities and {} blocks",
        drawing.entities.len(),
        drawing.blocks.len()
    );

    let output = run_pipeline(&drawing, &config);

    let file_name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drawing".to_string());
    let manifest = assemble(&file_name, &output);

    fs::create_dir_all(&args.out)?;
    let stem = manifest.file_info.sloper_name.clone();
    for piece in &output.pieces {
        if let Some(image) = &piece.image {
            let png = image.to_png()?;
            let path = args.out.join(format!("{}_{}.png", stem, piece.entity_index));
            fs::write(&path, png)?;
        }
    }

    let manifest_path = args.out.join(format!("{stem}.sloper.json"));
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    info!(
        "Wrote {} pieces and {}",
        manifest.cut.len(),
        manifest_path.display()
    );

    Ok(())
}
