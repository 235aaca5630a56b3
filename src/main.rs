use anyhow::Result;
use clap::Parser;

use crate::config::DemoConfig;

mod animation;
mod camera;
mod config;
mod demo;
mod engine;
mod geometry;
mod gradient;
mod particles;
mod rendering;
mod scene_builder;
mod scene_graph;
mod ui;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = DemoConfig::parse();
    config.validate()?;

    pollster::block_on(window::run(config))?;

    Ok(())
}
