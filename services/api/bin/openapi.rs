//! Writes the OpenAPI document for the Casa API.
//!
//! Usage: `openapi [OUTPUT]`, defaulting to `openapi.json` in the current directory.

use anyhow::Context;
use casa_api::router::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let spec_json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to render OpenAPI document")?;
    std::fs::write(&output, spec_json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("OpenAPI document written to {}", output.display());
    Ok(())
}
