/*
    Run this benchmark with:
    cargo bench --bench handler

    Measures record assembly only. The processor discards every record.
*/

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use opentelemetry::baggage::BaggageExt;
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::{Context, InstrumentationScope, KeyValue};
use opentelemetry_appender_kv::{Attribute, HandlerOptions, Level, OtelHandler, Record};
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::logs::{LogProcessor, SdkLogRecord, SdkLoggerProvider};
use opentelemetry_sdk::Resource;
#[cfg(not(target_os = "windows"))]
use pprof::criterion::{Output, PProfProfiler};

#[derive(Debug)]
struct NoopProcessor;

impl LogProcessor for NoopProcessor {
    fn emit(&self, _: &mut SdkLogRecord, _: &InstrumentationScope) {}

    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }
}

fn provider() -> SdkLoggerProvider {
    SdkLoggerProvider::builder()
        .with_resource(
            Resource::builder_empty()
                .with_service_name("benchmark")
                .build(),
        )
        .with_log_processor(NoopProcessor)
        .build()
}

fn call_site_attributes(c: &mut Criterion) {
    let provider = provider();
    let handler = OtelHandler::new(&provider, HandlerOptions::new());
    let cx = Context::new();

    let mut group = c.benchmark_group("call_site_attributes");
    for num_attributes in [0, 2, 4, 8, 12] {
        let attrs: Vec<Attribute> = (0..num_attributes)
            .map(|i| Attribute::new(format!("field{i}"), format!("value{i}")))
            .collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(num_attributes),
            &attrs,
            |b, attrs| {
                b.iter(|| {
                    handler.handle(
                        &cx,
                        Record::new(Level::INFO, "Unable to process checkout.")
                            .with_attrs(attrs.iter().cloned()),
                    )
                });
            },
        );
    }
    group.finish();
}

fn derived_handler(c: &mut Criterion) {
    let provider = provider();
    let handler = OtelHandler::new(&provider, HandlerOptions::new().with_baggage(true))
        .with_attrs([
            Attribute::new("service", "checkout"),
            Attribute::new("version", 3),
        ])
        .with_group("request");

    let span_context = SpanContext::new(
        TraceId::from_bytes(1_u128.to_be_bytes()),
        SpanId::from_bytes(1_u64.to_be_bytes()),
        TraceFlags::SAMPLED,
        false,
        TraceState::default(),
    );
    let cx = Context::new()
        .with_remote_span_context(span_context)
        .with_baggage(vec![KeyValue::new("env", "prod")]);

    c.bench_function("derived_handler_with_context", |b| {
        b.iter(|| {
            handler.handle(
                &cx,
                Record::new(Level::WARN, "Unable to process checkout.").with_attrs([
                    Attribute::new("id", 42),
                    Attribute::group("user", [Attribute::new("name", "otel")]),
                ]),
            )
        });
    });
}

fn level_gate(c: &mut Criterion) {
    let provider = provider();
    let handler = OtelHandler::new(&provider, HandlerOptions::new().with_level(Level::WARN));
    let cx = Context::new();

    c.bench_function("below_minimum_level", |b| {
        b.iter(|| handler.handle(&cx, Record::new(Level::DEBUG, "dropped")));
    });
}

#[cfg(not(target_os = "windows"))]
criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(1))
        .measurement_time(std::time::Duration::from_secs(2))
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = call_site_attributes, derived_handler, level_gate
}

#[cfg(target_os = "windows")]
criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(1))
        .measurement_time(std::time::Duration::from_secs(2));
    targets = call_site_attributes, derived_handler, level_gate
}

criterion_main!(benches);
