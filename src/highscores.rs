//! Persist the best score to disk (XDG config or ~/.config/slidetui).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "best";

/// Config directory for slidetui (best score, default log file).
pub fn config_dir() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("slidetui")
}

fn best_path() -> PathBuf {
    config_dir().join(FILENAME)
}

/// Load the best score. 0 on missing file or parse error.
pub fn load_best() -> u32 {
    load_best_from(&best_path())
}

fn load_best_from(path: &Path) -> u32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.lines().next().and_then(|l| l.trim().parse().ok()))
        .unwrap_or(0)
}

/// Save the best score. Creates the config directory if needed.
pub fn save_best(best: u32) -> Result<()> {
    save_best_to(&best_path(), best)
}

fn save_best_to(path: &Path, best: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", best)).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
