use anyhow::{Context, Result};
use clap::Parser;
use cubefx::config::Config;
use cubefx::state::SceneState;
use cubefx::viewer::Viewer;
use cubefx::widget::ViewportWidget;
use log::info;
use std::fs::File;

/// Logs go to stderr for snapshots. The terminal view only logs when a
/// log file is given, since stderr shares the screen.
fn init_logging(config: &Config) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if config.snapshot.is_none() {
        let Some(path) = &config.log_file else {
            return Ok(());
        };
        let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    let mut state = SceneState::new();
    config.apply(&mut state);
    let mut viewer = Viewer::new(state, config.viewport());

    match &config.snapshot {
        Some(path) => {
            viewer
                .snapshot(path)
                .with_context(|| format!("failed to write snapshot {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => {
            ViewportWidget::new(viewer, config.cube_texture.clone(), config.floor_texture.clone()).run()?;
        }
    }

    Ok(())
}
