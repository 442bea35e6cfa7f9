use std::fmt;
use std::str::FromStr;

use opentelemetry::logs::Severity;

/// Offset between a [`Level`] and the OpenTelemetry severity number.
const SEVERITY_OFFSET: i32 = 9;

/// Severity text indexed by severity number minus one.
#[rustfmt::skip]
const SEVERITY_TEXT: [&str; 24] = [
    "TRACE", "TRACE+1", "TRACE+2", "TRACE+3",
    "DEBUG", "DEBUG+1", "DEBUG+2", "DEBUG+3",
    "INFO", "INFO+1", "INFO+2", "INFO+3",
    "WARN", "WARN+1", "WARN+2", "WARN+3",
    "ERROR", "ERROR+1", "ERROR+2", "ERROR+3",
    "FATAL", "FATAL+1", "FATAL+2", "FATAL+3",
];

/// Importance of a log record, as an integer offset.
///
/// The named levels are four apart, leaving room for intermediate levels
/// (`INFO+2` sits between `INFO` and `WARN`). Each level maps onto exactly one
/// OpenTelemetry [`Severity`]: the severity number is the level plus nine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    /// Finest-grained diagnostics.
    pub const TRACE: Level = Level(-8);
    /// Debugging information.
    pub const DEBUG: Level = Level(-4);
    /// Informational messages.
    pub const INFO: Level = Level(0);
    /// Something unexpected that the program recovered from.
    pub const WARN: Level = Level(4);
    /// An operation failed.
    pub const ERROR: Level = Level(8);
    /// The program cannot continue.
    pub const FATAL: Level = Level(12);

    const NAMED: [(Level, &'static str); 6] = [
        (Level::TRACE, "TRACE"),
        (Level::DEBUG, "DEBUG"),
        (Level::INFO, "INFO"),
        (Level::WARN, "WARN"),
        (Level::ERROR, "ERROR"),
        (Level::FATAL, "FATAL"),
    ];

    /// Level at the given offset.
    pub const fn new(offset: i32) -> Self {
        Level(offset)
    }

    /// The integer offset of this level.
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// The OpenTelemetry severity for this level. Levels with no
    /// corresponding severity map to [`Severity::Trace`].
    pub fn severity(self) -> Severity {
        self.0
            .checked_add(SEVERITY_OFFSET)
            .and_then(severity_from_number)
            .unwrap_or(Severity::Trace)
    }

    /// The level's canonical name, e.g. `INFO` or `WARN+2`. Levels with no
    /// corresponding severity are reported as `TRACE`.
    pub fn severity_text(self) -> &'static str {
        self.0
            .checked_add(SEVERITY_OFFSET)
            .filter(|number| (1..=24).contains(number))
            .map_or(SEVERITY_TEXT[0], |number| SEVERITY_TEXT[(number - 1) as usize])
    }
}

fn severity_from_number(number: i32) -> Option<Severity> {
    let severity = match number {
        1 => Severity::Trace,
        2 => Severity::Trace2,
        3 => Severity::Trace3,
        4 => Severity::Trace4,
        5 => Severity::Debug,
        6 => Severity::Debug2,
        7 => Severity::Debug3,
        8 => Severity::Debug4,
        9 => Severity::Info,
        10 => Severity::Info2,
        11 => Severity::Info3,
        12 => Severity::Info4,
        13 => Severity::Warn,
        14 => Severity::Warn2,
        15 => Severity::Warn3,
        16 => Severity::Warn4,
        17 => Severity::Error,
        18 => Severity::Error2,
        19 => Severity::Error3,
        20 => Severity::Error4,
        21 => Severity::Fatal,
        22 => Severity::Fatal2,
        23 => Severity::Fatal3,
        24 => Severity::Fatal4,
        _ => return None,
    };
    Some(severity)
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::ERROR,
            log::Level::Warn => Level::WARN,
            log::Level::Info => Level::INFO,
            log::Level::Debug => Level::DEBUG,
            log::Level::Trace => Level::TRACE,
        }
    }
}

/// Prints the closest named level at or below this one, plus any offset:
/// `INFO`, `INFO+2`, `TRACE-3`.
impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (base, name) = Level::NAMED
            .iter()
            .rev()
            .find(|(base, _)| base.0 <= self.0)
            .copied()
            .unwrap_or(Level::NAMED[0]);
        let delta = i64::from(self.0) - i64::from(base.0);
        match delta {
            0 => f.write_str(name),
            d if d > 0 => write!(f, "{name}+{d}"),
            d => write!(f, "{name}{d}"),
        }
    }
}

/// Error returned when a [`Level`] cannot be parsed from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseLevelError {
    /// Input was empty.
    #[error("level is empty")]
    Empty,

    /// Input did not start with a known level name.
    #[error("unknown level name {0:?}")]
    UnknownName(String),

    /// The offset after the level name is not a valid integer.
    #[error("invalid level offset {0:?}")]
    InvalidOffset(String),
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseLevelError::Empty);
        }
        if let Ok(offset) = s.parse::<i32>() {
            return Ok(Level(offset));
        }

        let split = s.find(['+', '-']).unwrap_or(s.len());
        let (name, offset) = s.split_at(split);
        let base = Level::NAMED
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map(|(level, _)| *level)
            .ok_or_else(|| ParseLevelError::UnknownName(name.to_string()))?;

        if offset.is_empty() {
            return Ok(base);
        }
        offset
            .parse::<i32>()
            .ok()
            .and_then(|delta| base.0.checked_add(delta))
            .map(Level)
            .ok_or_else(|| ParseLevelError::InvalidOffset(offset.to_string()))
    }
}
