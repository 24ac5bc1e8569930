//! App: terminal init, main loop, slide timer, keyboard and gesture input.

use crate::game::GameState;
use crate::gesture::{GestureEvent, GestureLink, HttpGestureSource, spawn_poller};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{GameConfig, engine::Direction, highscores};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{info, warn};

/// Render at ~60 FPS.
const FRAME: Duration = Duration::from_millis(16);
/// Upper bound on one gesture request.
const GESTURE_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    gesture: GestureLink,
    gesture_rx: Option<Receiver<GestureEvent>>,
    /// Start of the slide being animated; set exactly while a move is pending.
    slide_started: Option<Instant>,
    /// TachyonFX fade for freshly spawned tiles (created on first frame after a commit).
    spawn_effect: Option<Effect>,
    spawn_effect_process_time: Option<Instant>,
    /// Best score as last written to disk.
    saved_best: u32,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, best: u32) -> Result<Self> {
        let state = GameState::new(&config, best);
        let gesture_rx = match &config.gesture_url {
            Some(url) => {
                info!(%url, interval_ms = config.poll_interval.as_millis() as u64, "polling gesture feed");
                let source = HttpGestureSource::new(url.clone(), GESTURE_REQUEST_TIMEOUT);
                Some(spawn_poller(source, config.poll_interval).context("starting gesture poller")?)
            }
            None => None,
        };
        Ok(Self {
            gesture: GestureLink::new(gesture_rx.is_some()),
            gesture_rx,
            config,
            theme,
            state,
            slide_started: None,
            spawn_effect: None,
            spawn_effect_process_time: None,
            saved_best: best,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        self.persist_best();
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.drain_gestures(now);
            self.tick_slide(now);

            let slide_progress = self.slide_progress(now);
            let animate = !self.config.no_animation;
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    &self.gesture,
                    slide_progress,
                    &mut self.spawn_effect,
                    &mut self.spawn_effect_process_time,
                    now,
                    animate,
                )
            })?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    // Terminal auto-repeat and releases are not moves.
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key_to_action(key) {
                        Action::Quit => return Ok(()),
                        action => self.apply_action(action, Instant::now()),
                    }
                }
            }
        }
    }

    fn apply_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Move(direction) => self.try_move(direction, now),
            Action::Restart => self.restart(),
            Action::KeepGoing => self.state.keep_going(),
            Action::Quit | Action::None => {}
        }
    }

    /// Start a move; dropped silently while a slide is in flight or the game is over.
    fn try_move(&mut self, direction: Direction, now: Instant) {
        if self.state.begin_move(direction).is_none() {
            return;
        }
        if self.config.no_animation {
            self.commit();
        } else {
            self.slide_started = Some(now);
        }
    }

    /// Commit once the slide has run its full length. There is no abort path.
    fn tick_slide(&mut self, now: Instant) {
        let Some(started) = self.slide_started else {
            return;
        };
        if now.saturating_duration_since(started) >= self.config.animation {
            self.commit();
        }
    }

    fn slide_progress(&self, now: Instant) -> Option<f32> {
        let started = self.slide_started?;
        let total = self.config.animation.as_secs_f32();
        if total <= 0.0 {
            return Some(1.0);
        }
        Some((now.saturating_duration_since(started).as_secs_f32() / total).min(1.0))
    }

    fn commit(&mut self) {
        self.state.finish_move();
        self.slide_started = None;
        self.reset_spawn_effect();
    }

    fn restart(&mut self) {
        self.persist_best();
        self.state.reset();
        self.slide_started = None;
        self.reset_spawn_effect();
    }

    fn reset_spawn_effect(&mut self) {
        self.spawn_effect = None;
        self.spawn_effect_process_time = None;
    }

    /// Pull every queued gesture sample. Edges found here go through the same
    /// move gate as keys, so at most one of them starts a slide.
    fn drain_gestures(&mut self, now: Instant) {
        let Some(rx) = &self.gesture_rx else {
            return;
        };
        let mut fired = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(event) => fired.extend(self.gesture.handle(event, now)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected {
            warn!("gesture poller stopped");
            self.gesture_rx = None;
        }
        for direction in fired {
            self.try_move(direction, now);
        }
    }

    fn persist_best(&mut self) {
        if !self.config.save_best || self.state.best <= self.saved_best {
            return;
        }
        match highscores::save_best(self.state.best) {
            Ok(()) => {
                info!(best = self.state.best, "best score saved");
                self.saved_best = self.state.best;
            }
            Err(e) => warn!(error = %e, "saving best score failed"),
        }
    }
}
