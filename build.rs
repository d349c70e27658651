//! Build script for spotlist.
//!
//! Copies the `.env.example` template to the local data directory, next to
//! the `.env` file the CLI reads at startup.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to the platform data directory:
///
/// - Linux: `~/.local/share/spotlist/.env.example`
/// - macOS: `~/Library/Application Support/spotlist/.env.example`
/// - Windows: `%LOCALAPPDATA%/spotlist/.env.example`
///
/// A missing template only produces a cargo warning.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotlist");
    fs::create_dir_all(&out_dir)?;

    if template.is_file() {
        fs::copy(&template, out_dir.join(".env.example"))?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
    }

    Ok(())
}
