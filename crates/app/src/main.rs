//! Entry point for orbitview.
//! Loads a mesh, runs the object-space steps and optionally writes
//! upload-ready vertex/index buffers.

mod config;
mod viewer;

use anyhow::Result;
use clap::Parser;

use crate::{
    config::{Cli, ViewerConfig},
    viewer::Viewer,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::from_cli(Cli::parse())?;
    log::info!(
        "Starting orbitview. Source: {:?}, compute_normals={}, normalize={}, mode={:?}",
        config.source,
        config.compute_normals,
        config.normalize,
        config.mode
    );

    let output = config.output.clone();
    let mut viewer = Viewer::load(config)?;
    viewer.prepare();
    viewer.report();

    if let Some(prefix) = output {
        viewer.write_buffers(&prefix)?;
    }

    log::info!("Done.");
    Ok(())
}
