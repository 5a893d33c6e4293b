//! `image-retag` command - Rewrite an image tarball under a new layer ID.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use clap::Args;
use image_retag_core::{open_input, retag_archive, ImageId, MetadataOverrides, RetagConfig};

#[derive(Args)]
pub struct RetagArgs {
    /// Layer ID to replace (64 hex digits, any case)
    pub old_id: ImageId,

    /// Replacement layer ID (64 hex digits, any case)
    pub new_id: ImageId,

    /// Metadata overrides merged into the layer's json record, as KEY VALUE pairs.
    /// Values starting with `-` go after `--`
    #[arg(value_name = "KEY VALUE")]
    pub metadata: Vec<String>,

    /// Read the archive from a file instead of stdin (gzip and bzip2 are detected)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write the archive to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RetagArgs {
    /// Resolve the run configuration. Fails before any archive I/O.
    pub fn config(&self) -> Result<RetagConfig, Box<dyn std::error::Error>> {
        let overrides = MetadataOverrides::from_pairs(&self.metadata)?;
        Ok(RetagConfig::new(
            self.old_id.clone(),
            self.new_id.clone(),
            overrides,
        ))
    }
}

pub fn execute(args: RetagArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config()?;

    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = retag_archive(open_input(input)?, output, &config)?;

    tracing::info!(
        old_id = %config.old_id,
        new_id = %config.new_id,
        members = summary.members,
        renamed = summary.renamed,
        "Retagged image layer"
    );

    if summary.renamed == 0 {
        tracing::warn!(old_id = %config.old_id, "No archive member matched the old layer ID");
    }

    Ok(())
}
