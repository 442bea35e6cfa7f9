//! # OpenTelemetry-Appender-KV
//!
//! This crate adapts structured key/value loggers to OpenTelemetry logs. Each
//! record handed to an [`OtelHandler`] is converted into an OpenTelemetry
//! `LogRecord`, correlated with the active span, and emitted through a
//! [`Logger`](opentelemetry::logs::Logger).
//!
//! ## Features
//!
//! - Converts typed attributes, including nested groups, arrays, durations,
//!   timestamps and errors, into OpenTelemetry attributes
//! - Maps integer levels onto OpenTelemetry severity numbers
//! - Derives loggers with [`OtelHandler::with_attrs`] and
//!   [`OtelHandler::with_group`] without affecting the parent
//! - Attaches trace context (`TraceId`, `SpanId`, `TraceFlags`) from the
//!   [`Context`](opentelemetry::Context) of the call, and optionally its baggage
//! - Bridges the [`log`](https://docs.rs/log) crate through
//!   [`OpenTelemetryLogBridge`]
//!
//! ## Getting Started
//!
//! ```rust
//! use opentelemetry::Context;
//! use opentelemetry_appender_kv::{Attribute, HandlerOptions, Level, OtelHandler, Record};
//! use opentelemetry_sdk::logs::SdkLoggerProvider;
//! use opentelemetry_stdout::LogExporter;
//!
//! let provider = SdkLoggerProvider::builder()
//!     .with_simple_exporter(LogExporter::default())
//!     .build();
//!
//! let handler = OtelHandler::new(&provider, HandlerOptions::new().with_level(Level::DEBUG))
//!     .with_attrs([Attribute::new("service", "checkout")])
//!     .with_group("request");
//!
//! handler.handle(
//!     &Context::current(),
//!     Record::new(Level::INFO, "order placed").with_attrs([Attribute::new("id", 42)]),
//! );
//! ```
//!
//! The record above carries `service="checkout"` and `request.id=42`.
//!
//! ## Level Mapping
//!
//! Levels are integer offsets. The severity number is the level plus nine and
//! the severity text is the level's name; levels whose severity number falls
//! outside `1..=24` are reported as `TRACE`.
//!
//! | Level      | Severity number | Severity text |
//! |------------|-----------------|---------------|
//! | `TRACE`    | 1               | `TRACE`       |
//! | `DEBUG`    | 5               | `DEBUG`       |
//! | `INFO`     | 9               | `INFO`        |
//! | `INFO+2`   | 11              | `INFO+2`      |
//! | `WARN`     | 13              | `WARN`        |
//! | `ERROR`    | 17              | `ERROR`       |
//! | `FATAL`    | 21              | `FATAL`       |
//!
//! ## Data Type Mapping
//!
//! | Attribute value                     | OpenTelemetry attribute                  |
//! |-------------------------------------|------------------------------------------|
//! | `bool`, `i64`, `f64`, string        | Same type                                |
//! | `u64`                               | `i64`, bits reinterpreted                |
//! | `Duration`                          | `f64` seconds                            |
//! | `SystemTime`                        | `i64` Unix seconds                       |
//! | Binary                              | Base64 string                            |
//! | Byte string                         | UTF-8 string, lossy                      |
//! | Array of string, `i64` or `bool`    | Array                                    |
//! | Any other array                     | One string attribute per element         |
//! | Group                               | Members flattened as `group.member`      |
//! | Error                               | `exception.message`                      |
//! | `Display` / `Debug` value           | String                                   |
//!
//! Records above `INFO` additionally carry the caller as `exception.type` and
//! the stack trace as `exception.stacktrace` when the source provides them.
//!
//! ## Feature Flags
//!
//! - `internal-logs` (default): emit diagnostics about the appender itself
//!   through OpenTelemetry's internal logging.
//! - `spec_unstable_logs_enabled`: consult
//!   [`Logger::event_enabled`](opentelemetry::logs::Logger) before building a
//!   record in [`OpenTelemetryLogBridge`].
//!
//! ## Supported Rust Versions
//!
//! OpenTelemetry is built against the latest stable release. The minimum
//! supported version is 1.75.
mod attribute;
mod convert;
mod handler;
mod level;
mod log_bridge;
mod state;

pub use attribute::{AttrValue, Attribute};
pub use convert::to_otel_attributes;
pub use handler::{HandlerOptions, OtelHandler, Record};
pub use level::{Level, ParseLevelError};
pub use log_bridge::OpenTelemetryLogBridge;
pub use state::HandlerState;
