//! `bundle` subcommand

use crate::aws::{Error, FUNCTION_HANDLER};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

/// Source file compiled into the artifact
const ENTRYPOINT: &str = "main.go";

/// Cross-compiles the function source into `<output>/bootstrap`.
///
/// Runs the same compilation the declared build container performs, so a
/// locally produced artifact matches what the provisioning engine would
/// build. A non-zero compiler exit aborts the pass.
pub async fn bundle(source: &Path, output: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(output)?;
    // The compiler runs in the source directory; resolve the artifact path
    // before changing directories.
    let output = std::fs::canonicalize(output)?;
    let artifact = output.join(FUNCTION_HANDLER);
    info!(source = ?source, artifact = ?artifact, "building function artifact");

    let status = Command::new("go")
        .arg("build")
        .arg("-o")
        .arg(&artifact)
        .arg(ENTRYPOINT)
        .env("GOOS", "linux")
        .env("GOARCH", "amd64")
        .current_dir(source)
        .status()
        .await?;
    if !status.success() {
        return Err(Error::BuildFailed(status));
    }
    info!(artifact = ?artifact, "built function artifact");
    Ok(())
}
