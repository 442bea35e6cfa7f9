use log::kv::{self, VisitSource};
use log::{Metadata, Record as LogCrateRecord};
use opentelemetry::logs::{Logger, LoggerProvider};
use opentelemetry::Context;

use crate::attribute::{AttrValue, Attribute};
use crate::handler::{HandlerOptions, OtelHandler, Record};
use crate::level::Level;

/// Bridges the [`log`] crate to OpenTelemetry through an [`OtelHandler`].
///
/// Structured key/values passed to `log` macros become attributes of the
/// emitted record. The ambient [`Context::current`] supplies trace
/// correlation and baggage.
#[derive(Debug)]
pub struct OpenTelemetryLogBridge<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    handler: OtelHandler<P, L>,
}

impl<P, L> OpenTelemetryLogBridge<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    /// Create a bridge with default [`HandlerOptions`].
    pub fn new(provider: &P) -> Self {
        Self::with_options(provider, HandlerOptions::default())
    }

    /// Create a bridge with the given options.
    pub fn with_options(provider: &P, options: HandlerOptions) -> Self {
        OpenTelemetryLogBridge {
            handler: OtelHandler::new(provider, options),
        }
    }

    /// Create a bridge on top of an existing, possibly derived, handler.
    pub fn from_handler(handler: OtelHandler<P, L>) -> Self {
        OpenTelemetryLogBridge { handler }
    }
}

impl<P, L> log::Log for OpenTelemetryLogBridge<P, L>
where
    P: LoggerProvider<Logger = L> + Send + Sync,
    L: Logger + Send + Sync,
{
    fn enabled(&self, metadata: &Metadata) -> bool {
        let level = Level::from(metadata.level());
        #[cfg(feature = "spec_unstable_logs_enabled")]
        return self.handler.enabled(level)
            && self
                .handler
                .logger
                .event_enabled(level.severity(), metadata.target(), None);
        #[cfg(not(feature = "spec_unstable_logs_enabled"))]
        self.handler.enabled(level)
    }

    fn log(&self, record: &LogCrateRecord) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut visitor = AttributeVisitor::default();
        if record.key_values().visit(&mut visitor).is_err() {
            return;
        }

        let mut source = Record::new(Level::from(record.level()), record.args().to_string())
            .with_attrs(visitor.attrs);
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            source = source.with_caller(format!("{file}:{line}"));
        }

        // Not `map_current`: the exporter may attach a context while emitting.
        let cx = Context::current();
        self.handler.handle(&cx, source);
    }

    fn flush(&self) {}
}

#[derive(Default)]
struct AttributeVisitor {
    attrs: Vec<Attribute>,
}

impl<'kvs> VisitSource<'kvs> for AttributeVisitor {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        self.attrs
            .push(Attribute::new(key.as_str().to_owned(), to_attr_value(&value)));
        Ok(())
    }
}

fn to_attr_value(value: &kv::Value<'_>) -> AttrValue {
    if let Some(b) = value.to_bool() {
        AttrValue::Bool(b)
    } else if let Some(i) = value.to_i64() {
        AttrValue::I64(i)
    } else if let Some(u) = value.to_u64() {
        AttrValue::U64(u)
    } else if let Some(f) = value.to_f64() {
        AttrValue::F64(f)
    } else if let Some(s) = value.to_borrowed_str() {
        AttrValue::from(s.to_owned())
    } else {
        AttrValue::from(value.to_string())
    }
}
