//! Synchronized console output.
//!
//! Three kinds of lines: transient progress (rewritten in place via a
//! carriage return), permanent info, and errors. A single mutex guards
//! both the terminal and the rate-limit clock, so a progress tick can
//! never read a stale clock value concurrently with another thread's
//! write — the unsynchronized-clock-read hazard the original program had.

use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum gap between accepted progress ticks. Calls arriving sooner are
/// dropped silently rather than queued.
const TICK_INTERVAL: Duration = Duration::from_millis(1);

/// A destination for progress, info, and warning output.
pub trait ProgressSink: Send + Sync {
    /// A permanent line, e.g. a result or summary.
    fn info(&self, message: &str);

    /// A permanent line reporting a worker-local failure.
    fn warn(&self, message: &str);

    /// A transient progress update. May be dropped if called too soon
    /// after the previous tick.
    fn tick(&self, message: &str);
}

struct TermState {
    last_tick: Option<Instant>,
    line_width: usize,
}

/// Prints to stdout/stderr, rewriting the current line for `tick`.
pub struct TermSink {
    state: Mutex<TermState>,
}

impl TermSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TermState {
                last_tick: None,
                line_width: 0,
            }),
        }
    }

    fn clear_line(state: &mut TermState) {
        if state.line_width > 0 {
            print!("\r{}\r", " ".repeat(state.line_width));
            state.line_width = 0;
        }
    }
}

impl Default for TermSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TermSink {
    fn info(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        Self::clear_line(&mut state);
        println!("{message}");
        let _ = std::io::stdout().flush();
    }

    fn warn(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        Self::clear_line(&mut state);
        eprintln!("Error: {message}");
        let _ = std::io::stderr().flush();
    }

    fn tick(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        if let Some(last) = state.last_tick {
            if now.duration_since(last) < TICK_INTERVAL {
                return;
            }
        }
        state.last_tick = Some(now);

        let padding = state.line_width.saturating_sub(message.len());
        print!("\r{message}{}", " ".repeat(padding));
        state.line_width = message.len();
        let _ = std::io::stdout().flush();
    }
}

/// Discards everything. Used when `-q`/`--quiet` is passed.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn tick(&self, _message: &str) {}
}

/// Records every call for inspection in tests.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn info(&self, message: &str) {
        self.events.lock().unwrap().push(format!("info:{message}"));
    }

    fn warn(&self, message: &str) {
        self.events.lock().unwrap().push(format!("warn:{message}"));
    }

    fn tick(&self, message: &str) {
        self.events.lock().unwrap().push(format!("tick:{message}"));
    }
}
