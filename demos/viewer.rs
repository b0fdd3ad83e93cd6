//! Minimal viewer: load a scene file and orbit around it.
//!
//! Usage: cargo run --example viewer -- path/to/scene.obj

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: viewer <scene.obj>")?;

    let mut app = bannock::default();
    app.add_object(&path)
        .with_context(|| format!("could not import {path}"))?;
    app.run();

    Ok(())
}
