//! Slidetui: a 2048-style sliding tile game in the terminal, played with the
//! keyboard or an external gesture recognizer.

mod app;
mod board;
mod engine;
mod game;
mod gesture;
mod highscores;
mod input;
mod merge;
mod motion;
mod rules;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Options derived from CLI that affect game behaviour (animation, gesture feed, seeding).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub animation: Duration,
    pub no_animation: bool,
    /// `None` when the gesture feed is disabled.
    pub gesture_url: Option<String>,
    pub poll_interval: Duration,
    pub save_best: bool,
}

impl GameConfig {
    fn from_args(args: &Args) -> Self {
        Self {
            seed: args.seed,
            animation: Duration::from_millis(args.animation_ms),
            no_animation: args.no_animation || args.animation_ms == 0,
            gesture_url: (!args.no_gesture).then(|| args.gesture_url.clone()),
            poll_interval: Duration::from_millis(args.poll_ms.max(10)),
            save_best: !args.no_save,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "theme not loaded, using defaults");
        theme::Theme::default()
    });
    let config = GameConfig::from_args(&args);
    let best = highscores::load_best();
    let mut app = App::new(config, theme, best)?;
    app.run()?;
    Ok(())
}

/// Log to a file: the terminal belongs to the game. Logging is skipped if the
/// file cannot be opened.
fn init_logging(args: &Args) {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| highscores::config_dir().join("slidetui.log"));
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();
}

/// 2048-style sliding tile puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "slidetui",
    version,
    about = "2048-style sliding tile puzzle in the terminal. Slide tiles, merge equal pairs, reach 2048.",
    long_about = "Slidetui is a terminal take on 2048.\n\n\
        Every move slides all tiles as far as they go; two equal tiles that collide merge into \
        one holding their sum, and a new 2 or 4 appears. Reach a 2048 tile to win, then keep \
        going for a higher score.\n\n\
        CONTROLS:\n  Arrows / hjkl / wasd  Move    R  Restart    C  Keep going after a win    Q / Esc  Quit\n\n\
        Moves can also come from a gesture recognizer polled over HTTP (see --gesture-url); \
        a held gesture counts once."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette for tiles: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Gesture recognizer endpoint answering {"gesture": "...", "proximity": N}.
    #[arg(long, default_value = "http://127.0.0.1:5000/gesture", value_name = "URL")]
    pub gesture_url: String,

    /// Gesture poll interval in ms.
    #[arg(long, default_value = "120", value_name = "MS")]
    pub poll_ms: u64,

    /// Do not poll the gesture recognizer (keyboard only).
    #[arg(long)]
    pub no_gesture: bool,

    /// Slide animation length in ms. Input is ignored while a slide animates.
    #[arg(long, default_value = "140", value_name = "MS")]
    pub animation_ms: u64,

    /// Disable slide animation (moves commit instantly).
    #[arg(long)]
    pub no_animation: bool,

    /// Seed for tile spawning (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Do not write the best score to disk.
    #[arg(long)]
    pub no_save: bool,

    /// Log file. Defaults to slidetui.log in the config directory.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Tracing filter, e.g. "info", "debug", "slidetui=trace".
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
