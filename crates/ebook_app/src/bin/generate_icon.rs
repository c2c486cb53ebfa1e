//! Renders the application icon (an open book on a violet gradient) to PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ebook_engine::write_icon;

#[derive(Parser)]
#[command(name = "generate_icon")]
#[command(about = "Generate the ebook converter icon as PNG")]
struct Cli {
    /// Destination PNG file
    #[arg(short, long, default_value = "icon.png")]
    output: PathBuf,

    /// Edge length in pixels
    #[arg(long, default_value_t = 1024)]
    size: u32,

    /// Also write a smaller preview image here
    #[arg(long)]
    preview: Option<PathBuf>,

    #[arg(long, default_value_t = 256)]
    preview_size: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let written = write_icon(&cli.output, cli.size)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("Saved: {} ({}x{})", written.display(), cli.size, cli.size);

    if let Some(preview) = &cli.preview {
        let written = write_icon(preview, cli.preview_size)
            .with_context(|| format!("writing {}", preview.display()))?;
        println!(
            "Saved: {} ({}x{})",
            written.display(),
            cli.preview_size,
            cli.preview_size
        );
    }
    Ok(())
}
