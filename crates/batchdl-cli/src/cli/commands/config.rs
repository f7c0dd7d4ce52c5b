//! `batchdl config` – show where the config lives and what it resolves to.

use anyhow::Result;
use batchdl_core::config::{self, BatchConfig};
use batchdl_core::engine::{ConfiguredEngine, Engine};

pub fn run_config(cfg: &BatchConfig) -> Result<()> {
    let path = config::config_path()?;
    let engine = ConfiguredEngine::from_config(&cfg.engine);
    let sample = engine.build_arguments("<url>", "");

    println!("config:       {}", path.display());
    println!("engine:       {}", engine.name());
    println!("command:      {}", engine.command_display_string(&sample));
    println!("concurrency:  {}", cfg.effective_concurrency());
    println!(
        "folder:       {}",
        cfg.download_folder
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(current directory)".to_string())
    );
    println!("playlists:    {}", if engine.supports_playlists() { "yes" } else { "no" });
    if let Some(cmd) = &cfg.command_on_successful_download {
        println!("on success:   {}", cmd);
    }
    if let Some(cmd) = &cfg.command_when_all_finished {
        println!("on all done:  {}", cmd);
    }
    Ok(())
}
