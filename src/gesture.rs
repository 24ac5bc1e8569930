//! Gesture feed: polls an external recognizer and turns its labels into moves.
//!
//! The recognizer is reached over HTTP and answers with the label it currently
//! sees. Polling happens on a background thread that only forwards samples; the
//! UI thread owns the edge trigger and the game, so keyboard and gesture input
//! are handled one at a time by the same loop.

use crate::engine::Direction;
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long the last seen gesture stays on screen after the feed goes quiet.
pub const GESTURE_HANG: Duration = Duration::from_millis(635);

/// Proximity at which the meter is full.
const PROXIMITY_FULL_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureLabel {
    Up,
    Down,
    Left,
    Right,
    #[default]
    #[serde(other)]
    Nothing,
}

impl GestureLabel {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::Nothing => None,
        }
    }

    pub fn arrow(self) -> &'static str {
        self.direction().map_or("·", Direction::arrow)
    }
}

/// One answer from the recognizer: `{"gesture": "left", "proximity": 7.2}`.
/// A missing or null gesture reads as `nothing`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct GestureReading {
    #[serde(default)]
    gesture: Option<GestureLabel>,
    #[serde(default)]
    pub proximity: f64,
}

impl GestureReading {
    pub fn label(&self) -> GestureLabel {
        self.gesture.unwrap_or_default()
    }
}

#[cfg(test)]
impl GestureReading {
    pub(crate) fn new(label: GestureLabel, proximity: f64) -> Self {
        Self {
            gesture: Some(label),
            proximity,
        }
    }
}

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("request failed: {0}")]
    Request(#[from] ureq::Error),
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Anything that can be sampled for the current gesture label.
pub trait GestureSource: Send {
    fn sample(&mut self) -> Result<GestureReading, GestureError>;
}

pub struct HttpGestureSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpGestureSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url: url.into(),
        }
    }
}

impl GestureSource for HttpGestureSource {
    fn sample(&mut self) -> Result<GestureReading, GestureError> {
        let body = self.agent.get(&self.url).call()?.into_string()?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Reading(GestureReading),
    Failed(String),
}

/// Sample `source` every `interval` on a background thread. The thread exits
/// once the receiver is dropped.
pub fn spawn_poller<S>(mut source: S, interval: Duration) -> std::io::Result<Receiver<GestureEvent>>
where
    S: GestureSource + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("gesture-poll".into())
        .spawn(move || {
            loop {
                let started = Instant::now();
                let event = match source.sample() {
                    Ok(reading) => GestureEvent::Reading(reading),
                    Err(e) => GestureEvent::Failed(e.to_string()),
                };
                if tx.send(event).is_err() {
                    break;
                }
                thread::sleep(interval.saturating_sub(started.elapsed()));
            }
        })?;
    Ok(rx)
}

/// Level-to-edge conversion: a direction fires only when the label changes,
/// so a held gesture does not repeat every poll.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    last: GestureLabel,
}

impl EdgeTrigger {
    pub fn observe(&mut self, label: GestureLabel) -> Option<Direction> {
        let changed = label != self.last;
        self.last = label;
        if changed { label.direction() } else { None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Disabled,
    Connecting,
    Connected,
    Reconnecting,
}

impl LinkStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "Keyboard only",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Reconnecting => "Reconnecting...",
        }
    }
}

/// UI-side view of the gesture feed: edge trigger plus what the sidebar shows.
#[derive(Debug, Clone)]
pub struct GestureLink {
    trigger: EdgeTrigger,
    status: LinkStatus,
    held: GestureLabel,
    held_at: Option<Instant>,
    proximity: f64,
}

impl GestureLink {
    pub fn new(enabled: bool) -> Self {
        Self {
            trigger: EdgeTrigger::default(),
            status: if enabled {
                LinkStatus::Connecting
            } else {
                LinkStatus::Disabled
            },
            held: GestureLabel::Nothing,
            held_at: None,
            proximity: 0.0,
        }
    }

    /// Feed one poll result; returns the direction to play, if the label just
    /// changed to one. Failed polls leave the trigger untouched.
    pub fn handle(&mut self, event: GestureEvent, now: Instant) -> Option<Direction> {
        match event {
            GestureEvent::Reading(reading) => {
                if self.status != LinkStatus::Connected {
                    info!("gesture feed connected");
                    self.status = LinkStatus::Connected;
                }
                self.proximity = reading.proximity;
                let label = reading.label();
                if label != GestureLabel::Nothing {
                    self.held = label;
                    self.held_at = Some(now);
                }
                let fired = self.trigger.observe(label);
                if let Some(direction) = fired {
                    debug!(%direction, proximity = reading.proximity, "gesture");
                }
                fired
            }
            GestureEvent::Failed(reason) => {
                if self.status == LinkStatus::Connected {
                    warn!(%reason, "gesture feed lost");
                } else {
                    debug!(%reason, "gesture poll failed");
                }
                self.status = LinkStatus::Reconnecting;
                None
            }
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// Last non-nothing gesture while within the hang time, else nothing.
    pub fn display_label(&self, now: Instant) -> GestureLabel {
        match self.held_at {
            Some(t) if now.saturating_duration_since(t) < GESTURE_HANG => self.held,
            _ => GestureLabel::Nothing,
        }
    }

    pub fn proximity(&self) -> f64 {
        self.proximity
    }

    /// Proximity meter fill, 0.0..=1.0.
    pub fn proximity_ratio(&self) -> f64 {
        (self.proximity / PROXIMITY_FULL_SCALE).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Result<GestureReading, GestureError>>);

    impl GestureSource for Scripted {
        fn sample(&mut self) -> Result<GestureReading, GestureError> {
            self.0
                .pop_front()
                .unwrap_or_else(|| Ok(GestureReading::new(GestureLabel::Nothing, 0.0)))
        }
    }

    fn reading(label: GestureLabel) -> GestureEvent {
        GestureEvent::Reading(GestureReading::new(label, 0.0))
    }

    #[test]
    fn parses_recognizer_payloads() {
        let r: GestureReading = serde_json::from_str(r#"{"gesture": "left", "proximity": 7.5}"#).unwrap();
        assert_eq!(r.label(), GestureLabel::Left);
        assert_eq!(r.proximity, 7.5);

        let r: GestureReading = serde_json::from_str(r#"{"gesture": null}"#).unwrap();
        assert_eq!(r.label(), GestureLabel::Nothing);
        assert_eq!(r.proximity, 0.0);

        let r: GestureReading = serde_json::from_str(r#"{"gesture": "wave", "proximity": 3}"#).unwrap();
        assert_eq!(r.label(), GestureLabel::Nothing);

        let r: GestureReading = serde_json::from_str("{}").unwrap();
        assert_eq!(r.label(), GestureLabel::Nothing);

        assert!(serde_json::from_str::<GestureReading>("not json").is_err());
    }

    #[test]
    fn edge_trigger_fires_once_per_change() {
        use GestureLabel::*;
        let mut t = EdgeTrigger::default();
        let fired: Vec<_> = [Nothing, Up, Up, Up, Nothing, Up, Left, Left, Right]
            .into_iter()
            .map(|l| t.observe(l))
            .collect();
        assert_eq!(
            fired,
            vec![
                None,
                Some(Direction::Up),
                None,
                None,
                None,
                Some(Direction::Up),
                Some(Direction::Left),
                None,
                Some(Direction::Right),
            ]
        );
    }

    #[test]
    fn failed_polls_do_not_retrigger() {
        let now = Instant::now();
        let mut link = GestureLink::new(true);
        assert_eq!(link.status(), LinkStatus::Connecting);
        assert_eq!(link.handle(reading(GestureLabel::Down), now), Some(Direction::Down));
        assert_eq!(link.status(), LinkStatus::Connected);
        assert_eq!(link.handle(GestureEvent::Failed("timeout".into()), now), None);
        assert_eq!(link.status(), LinkStatus::Reconnecting);
        assert_eq!(link.handle(reading(GestureLabel::Down), now), None);
        assert_eq!(link.status(), LinkStatus::Connected);
    }

    #[test]
    fn display_holds_last_gesture_for_hang_time() {
        let t0 = Instant::now();
        let mut link = GestureLink::new(true);
        link.handle(reading(GestureLabel::Left), t0);
        link.handle(reading(GestureLabel::Nothing), t0 + Duration::from_millis(100));
        assert_eq!(link.display_label(t0 + Duration::from_millis(300)), GestureLabel::Left);
        assert_eq!(link.display_label(t0 + GESTURE_HANG), GestureLabel::Nothing);
    }

    #[test]
    fn proximity_meter_is_clamped() {
        let now = Instant::now();
        let mut link = GestureLink::new(true);
        link.handle(GestureEvent::Reading(GestureReading::new(GestureLabel::Nothing, 5.0)), now);
        assert!((link.proximity_ratio() - 0.5).abs() < f64::EPSILON);
        link.handle(GestureEvent::Reading(GestureReading::new(GestureLabel::Nothing, 42.0)), now);
        assert_eq!(link.proximity_ratio(), 1.0);
        assert_eq!(link.proximity(), 42.0);
    }

    #[test]
    fn poller_forwards_samples_in_order() {
        let script = VecDeque::from([
            Ok(GestureReading::new(GestureLabel::Up, 8.0)),
            Err(GestureError::Read(std::io::Error::other("reset"))),
            Ok(GestureReading::new(GestureLabel::Right, 9.0)),
        ]);
        let rx = spawn_poller(Scripted(script), Duration::from_millis(1)).unwrap();
        let events: Vec<_> = rx.iter().take(3).collect();
        assert_eq!(events[0], GestureEvent::Reading(GestureReading::new(GestureLabel::Up, 8.0)));
        assert!(matches!(&events[1], GestureEvent::Failed(msg) if msg.contains("reset")));
        assert_eq!(events[2], GestureEvent::Reading(GestureReading::new(GestureLabel::Right, 9.0)));
    }

    #[test]
    fn disabled_link_reports_keyboard_only() {
        let link = GestureLink::new(false);
        assert_eq!(link.status(), LinkStatus::Disabled);
        assert_eq!(link.status().label(), "Keyboard only");
    }
}
