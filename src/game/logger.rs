//! Match event logger
//!
//! Formats through a bump arena so the per-action log lines do not allocate
//! intermediate strings. Entries are captured as owned Strings so they can
//! outlive the arena reset.

use crate::core::PlayerId;
use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::Write as FmtWrite;

/// Log a line at Verbose level only when the `verbose-logging` feature is on.
///
/// With the feature disabled the `format!` is compiled out entirely.
macro_rules! log_if_verbose {
    ($logger:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}
pub(crate) use log_if_verbose;

/// Verbosity level for match output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityLevel {
    /// Silent - no output
    Silent = 0,
    /// Minimal - turn swaps only
    Minimal = 1,
    /// Normal - turns and phases (default)
    #[default]
    Normal = 2,
    /// Verbose - every action
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A captured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category ("action", "phase", "turn")
    pub category: Option<&'static str>,
}

/// Per-match logger
///
/// Only the configuration (verbosity, output mode) survives serialization;
/// the capture buffer is presentation state.
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,

    /// Arena for temporary formatting, reset after each line
    format_bump: RefCell<Bump>,

    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    /// Capture to memory only; the match actor drains the buffer after
    /// every command
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Drain captured entries
    pub fn take_logs(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.log_buffer.borrow_mut())
    }

    fn emit(&self, level: VerbosityLevel, category: Option<&'static str>, message: &str) {
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);

        if level > self.verbosity && !should_capture {
            return;
        }

        if should_capture {
            self.log_buffer.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category,
            });
        }

        if should_output && level <= self.verbosity {
            if level == VerbosityLevel::Minimal {
                println!("{message}");
            } else {
                println!("  {message}");
            }
        }
    }

    pub fn minimal(&self, message: &str) {
        self.emit(VerbosityLevel::Minimal, None, message);
    }

    pub fn normal(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, None, message);
    }

    pub fn verbose(&self, message: &str) {
        self.emit(VerbosityLevel::Verbose, None, message);
    }

    /// Log a committed action: "P0 play_card #12"
    pub fn action(&self, player: PlayerId, action_name: &str, detail: Option<&str>) {
        if VerbosityLevel::Verbose > self.verbosity && !self.is_capturing() {
            return;
        }
        {
            let bump = self.format_bump.borrow();
            let mut line = bumpalo::collections::String::new_in(&bump);
            let _ = write!(line, "{player} {action_name}");
            if let Some(detail) = detail {
                let _ = write!(line, " {detail}");
            }
            self.emit(VerbosityLevel::Verbose, Some("action"), line.as_str());
        }
        self.format_bump.borrow_mut().reset();
    }

    /// Log a phase transition at Normal level
    pub fn phase(&self, turn: u32, from: impl std::fmt::Display, to: impl std::fmt::Display) {
        if VerbosityLevel::Normal > self.verbosity && !self.is_capturing() {
            return;
        }
        {
            let bump = self.format_bump.borrow();
            let mut line = bumpalo::collections::String::new_in(&bump);
            let _ = write!(line, "Turn {turn}: {from} -> {to}");
            self.emit(VerbosityLevel::Normal, Some("phase"), line.as_str());
        }
        self.format_bump.borrow_mut().reset();
    }

    /// Log a turn swap at Minimal level
    pub fn turn(&self, turn: u32, round: u32, active: PlayerId) {
        if VerbosityLevel::Minimal > self.verbosity && !self.is_capturing() {
            return;
        }
        {
            let bump = self.format_bump.borrow();
            let mut line = bumpalo::collections::String::new_in(&bump);
            let _ = write!(line, "=== Turn {turn} (round {round}): {active} is active ===");
            self.emit(VerbosityLevel::Minimal, Some("turn"), line.as_str());
        }
        self.format_bump.borrow_mut().reset();
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

impl Clone for GameLogger {
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(self.log_buffer.borrow().clone()),
        }
    }
}

impl Serialize for GameLogger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("GameLogger", 2)?;
        state.serialize_field("verbosity", &self.verbosity)?;
        state.serialize_field("output_mode", &self.output_mode)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for GameLogger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GameLoggerData {
            #[serde(default)]
            verbosity: VerbosityLevel,
            #[serde(default)]
            output_mode: OutputMode,
        }

        let data = GameLoggerData::deserialize(deserializer)?;
        let mut logger = GameLogger::with_verbosity(data.verbosity);
        logger.output_mode = data.output_mode;
        Ok(logger)
    }
}
