use anyhow::{anyhow, Context};
use clap::Parser;
use env_logger::Env;

use ucho::{io, scene, ViewerApp, ViewerConfig, ViewerScene};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::parse();
    config.validate().map_err(|e| anyhow!(e))?;

    let volume = io::load_volume(&config.volume)
        .with_context(|| format!("loading volume {}", config.volume.display()))?;
    let surfaces = io::load_mesh_folder(&config.mesh_dir)
        .with_context(|| format!("loading meshes from {}", config.mesh_dir.display()))?;

    let actors = scene::build_actors(surfaces, config.opacity);
    let window_level = config
        .window_level()
        .ok_or_else(|| anyhow!("invalid window/level"))?;
    let scene = ViewerScene::new(volume, actors, window_level, config.step_policy());

    ViewerApp::new(scene, config.width, config.height)?.run()?;
    Ok(())
}
