//! Line-by-line caption reveal.
//!
//! The timer is a pure automaton over caller-supplied [`Instant`]s: nothing
//! fires on its own. Callers sleep until [`CaptionTimer::next_deadline`] and
//! then [`poll`](CaptionTimer::poll).
//!
//! For a caption of `n` lines activated at `t0`:
//!
//! - line `k` is shown from `t0 + k × interval`;
//! - a single line is cleared at `t0 + interval`;
//! - a multi-line caption is cleared at `t0 + n × interval + trailing`.

use crate::config::CaptionConfig;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionState {
    /// Showing the line at this index.
    Revealing(usize),
    Cleared,
}

#[derive(Debug, Clone)]
struct ActiveCaption {
    lines: Vec<String>,
    started: Instant,
    shown: usize,
}

#[derive(Debug, Clone)]
pub struct CaptionTimer {
    interval: Duration,
    trailing: Duration,
    active: Option<ActiveCaption>,
}

impl Default for CaptionTimer {
    fn default() -> Self {
        Self::new(&CaptionConfig::default())
    }
}

fn times(interval: Duration, k: usize) -> Duration {
    interval.saturating_mul(u32::try_from(k).unwrap_or(u32::MAX))
}

impl CaptionTimer {
    pub fn new(config: &CaptionConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.line_interval_ms.max(1)),
            trailing: Duration::from_millis(config.trailing_delay_ms),
            active: None,
        }
    }

    /// Start captioning `text`, replacing whatever was showing.
    pub fn activate(&mut self, text: &str, now: Instant) {
        self.active = Some(ActiveCaption {
            lines: text.split('\n').map(str::to_owned).collect(),
            started: now,
            shown: 0,
        });
    }

    /// Clear immediately and drop every pending deadline.
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Advance to the state due at `now`.
    pub fn poll(&mut self, now: Instant) -> CaptionState {
        let Some(clear_at) = self.clear_at() else {
            return CaptionState::Cleared;
        };
        if now >= clear_at {
            self.active = None;
            return CaptionState::Cleared;
        }
        let interval_ms = self.interval.as_millis().max(1);
        if let Some(active) = self.active.as_mut() {
            let elapsed_ms = now.saturating_duration_since(active.started).as_millis();
            let due = usize::try_from(elapsed_ms / interval_ms).unwrap_or(usize::MAX);
            active.shown = due.min(active.lines.len() - 1);
        }
        self.state()
    }

    pub fn state(&self) -> CaptionState {
        match &self.active {
            Some(active) => CaptionState::Revealing(active.shown),
            None => CaptionState::Cleared,
        }
    }

    /// The line currently on screen. An empty line shows nothing.
    pub fn caption(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|a| a.lines.get(a.shown))
            .map(String::as_str)
            .filter(|line| !line.is_empty())
    }

    /// When the next line is revealed or the caption clears.
    pub fn next_deadline(&self) -> Option<Instant> {
        let active = self.active.as_ref()?;
        if active.shown + 1 < active.lines.len() {
            Some(active.started + times(self.interval, active.shown + 1))
        } else {
            self.clear_at()
        }
    }

    fn clear_at(&self) -> Option<Instant> {
        let active = self.active.as_ref()?;
        let n = active.lines.len();
        Some(if n <= 1 {
            active.started + self.interval
        } else {
            active.started + times(self.interval, n) + self.trailing
        })
    }
}
