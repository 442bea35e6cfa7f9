use std::marker::PhantomData;
use std::sync::Arc;
use std::time::SystemTime;

use opentelemetry::baggage::BaggageExt;
use opentelemetry::logs::{AnyValue, LogRecord, Logger, LoggerProvider};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{otel_debug, Array, Context, InstrumentationScope, KeyValue, StringValue, Value};
use opentelemetry_semantic_conventions::attribute::{EXCEPTION_STACKTRACE, EXCEPTION_TYPE};

use crate::attribute::Attribute;
use crate::convert::append_attribute;
use crate::level::Level;
use crate::state::HandlerState;

const INSTRUMENTATION_NAME: &str = env!("CARGO_PKG_NAME");

/// Options for an [`OtelHandler`]. The default accepts `INFO` and above and
/// leaves baggage out.
#[derive(Clone, Debug, Default)]
pub struct HandlerOptions {
    level: Option<Level>,
    add_baggage: bool,
}

impl HandlerOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop records below `level`.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Copy every baggage member of the call's context into the record.
    pub fn with_baggage(mut self, add_baggage: bool) -> Self {
        self.add_baggage = add_baggage;
        self
    }

    /// The configured minimum level, `INFO` if unset.
    pub fn level(&self) -> Level {
        self.level.unwrap_or(Level::INFO)
    }
}

/// A log record as delivered by the source logger.
#[derive(Clone, Debug)]
pub struct Record {
    timestamp: Option<SystemTime>,
    level: Level,
    message: StringValue,
    attrs: Vec<Attribute>,
    caller: Option<String>,
    stacktrace: Option<String>,
}

impl Record {
    /// A record without timestamp or attributes.
    pub fn new(level: Level, message: impl Into<StringValue>) -> Self {
        Record {
            timestamp: None,
            level,
            message: message.into(),
            attrs: Vec::new(),
            caller: None,
            stacktrace: None,
        }
    }

    /// Time the event occurred. Without one, the observed time is used.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Append call-site attributes.
    pub fn with_attrs<I>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        self.attrs.extend(attrs);
        self
    }

    /// Location of the log call, reported as `exception.type` above `INFO`.
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Stack trace, reported as `exception.stacktrace` above `INFO`.
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }

    /// Level of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Call-site attributes.
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }
}

/// Turns [`Record`]s into OpenTelemetry log records and emits them through a
/// [`Logger`].
///
/// A handler is cheap to clone. [`with_attrs`](OtelHandler::with_attrs) and
/// [`with_group`](OtelHandler::with_group) derive new handlers that share the
/// logger with their parent.
pub struct OtelHandler<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    pub(crate) logger: Arc<L>,
    state: HandlerState,
    _phantom: PhantomData<P>, // P is not used.
}

impl<P, L> Clone for OtelHandler<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    fn clone(&self) -> Self {
        OtelHandler {
            logger: Arc::clone(&self.logger),
            state: self.state.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<P, L> std::fmt::Debug for OtelHandler<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelHandler")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<P, L> OtelHandler<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    /// Create a root handler emitting through a logger obtained from
    /// `provider`.
    pub fn new(provider: &P, options: HandlerOptions) -> Self {
        let scope = InstrumentationScope::builder(INSTRUMENTATION_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(opentelemetry_semantic_conventions::SCHEMA_URL)
            .build();
        let min_level = options.level();

        otel_debug!(
            name: "OtelHandler.Created",
            min_level = min_level.severity_text(),
            add_baggage = options.add_baggage,
        );

        OtelHandler {
            logger: Arc::new(provider.logger_with_scope(scope)),
            state: HandlerState::new(min_level, options.add_baggage),
            _phantom: PhantomData,
        }
    }

    /// The accumulated state of this handler.
    pub fn state(&self) -> &HandlerState {
        &self.state
    }

    /// Whether a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        self.state.enabled(level)
    }

    /// A handler that adds `attrs` to every record it emits.
    pub fn with_attrs<I>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        self.derive(self.state.with_attrs(attrs))
    }

    /// A handler that prefixes the keys of attributes added from now on with
    /// `name.`.
    pub fn with_group(&self, name: &str) -> Self {
        self.derive(self.state.with_group(name))
    }

    fn derive(&self, state: HandlerState) -> Self {
        OtelHandler {
            logger: Arc::clone(&self.logger),
            state,
            _phantom: PhantomData,
        }
    }

    /// Assemble `record` in the context `cx` and emit it. Records below the
    /// minimum level are dropped without side effects.
    pub fn handle(&self, cx: &Context, record: Record) {
        if !self.enabled(record.level) {
            return;
        }

        let mut log_record = self.logger.create_log_record();

        let span = cx.span();
        let span_context = span.span_context();
        if span_context.is_valid() {
            log_record.set_trace_context(
                span_context.trace_id(),
                span_context.span_id(),
                Some(span_context.trace_flags()),
            );
        }

        let attributes = self.collect_attributes(cx, &record);

        let severity = record.level.severity();
        let observed = SystemTime::now();
        log_record.set_observed_timestamp(observed);
        log_record.set_timestamp(record.timestamp.unwrap_or(observed));
        log_record.set_severity_number(severity);
        log_record.set_severity_text(record.level.severity_text());
        log_record.set_body(AnyValue::String(record.message));
        log_record.add_attributes(
            attributes
                .into_iter()
                .map(|kv| (kv.key, to_any_value(kv.value))),
        );

        self.logger.emit(log_record);
    }

    /// Baggage, then accumulated attributes, then call-site attributes.
    fn collect_attributes(&self, cx: &Context, record: &Record) -> Vec<KeyValue> {
        let mut attributes = Vec::with_capacity(self.state.attrs().len() + record.attrs.len());

        if self.state.include_baggage() {
            for (key, (value, _metadata)) in cx.baggage() {
                attributes.push(KeyValue::new(key.clone(), value.clone()));
            }
        }

        for attr in self.state.attrs() {
            append_attribute(&mut attributes, attr.key(), attr.value());
        }

        for attr in &record.attrs {
            append_attribute(&mut attributes, &self.state.prefixed(attr.key()), attr.value());
        }

        if record.level > Level::INFO {
            if let Some(caller) = record.caller.as_ref().filter(|c| !c.is_empty()) {
                attributes.push(KeyValue::new(EXCEPTION_TYPE, caller.clone()));
            }
            if let Some(stack) = record.stacktrace.as_ref().filter(|s| !s.is_empty()) {
                attributes.push(KeyValue::new(EXCEPTION_STACKTRACE, stack.clone()));
            }
        }

        attributes
    }
}

fn to_any_value(value: Value) -> AnyValue {
    match value {
        Value::Bool(b) => AnyValue::Boolean(b),
        Value::I64(i) => AnyValue::Int(i),
        Value::F64(f) => AnyValue::Double(f),
        Value::String(s) => AnyValue::String(s),
        Value::Array(Array::Bool(values)) => list(values.into_iter().map(AnyValue::Boolean)),
        Value::Array(Array::I64(values)) => list(values.into_iter().map(AnyValue::Int)),
        Value::Array(Array::F64(values)) => list(values.into_iter().map(AnyValue::Double)),
        Value::Array(Array::String(values)) => list(values.into_iter().map(AnyValue::String)),
        // Value is non-exhaustive.
        other => AnyValue::String(other.to_string().into()),
    }
}

fn list(values: impl Iterator<Item = AnyValue>) -> AnyValue {
    AnyValue::ListAny(Box::new(values.collect()))
}
