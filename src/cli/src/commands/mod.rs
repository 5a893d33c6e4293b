//! CLI command definitions and dispatch.

mod retag;

use clap::Parser;

pub use retag::RetagArgs;

/// Image Retag - rename a layer of a `docker save` tarball read from stdin.
///
/// Members under OLD_ID/ are moved to NEW_ID/ and the layer's json record
/// gets NEW_ID plus any KEY VALUE overrides. The rewritten archive is
/// written to stdout.
#[derive(Parser)]
#[command(name = "image-retag", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub args: RetagArgs,
}

/// Dispatch a parsed CLI to the command handler.
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    retag::execute(cli.args)
}
