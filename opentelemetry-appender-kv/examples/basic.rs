//! run with `$ cargo run --example basic`

use log::{error, info, Level as LogLevel};
use opentelemetry::Context;
use opentelemetry_appender_kv::{
    AttrValue, Attribute, HandlerOptions, Level, OpenTelemetryLogBridge, OtelHandler, Record,
};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::Resource;

fn main() {
    let exporter = opentelemetry_stdout::LogExporter::default();
    let provider = SdkLoggerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name("log-appender-kv-example")
                .build(),
        )
        .with_simple_exporter(exporter)
        .build();

    // Direct use of the handler.
    let handler = OtelHandler::new(&provider, HandlerOptions::new().with_level(Level::DEBUG))
        .with_attrs([Attribute::new("component", "checkout")])
        .with_group("order");
    handler.handle(
        &Context::current(),
        Record::new(Level::new(2), "order placed").with_attrs([
            Attribute::new("id", 20),
            Attribute::group("user", [Attribute::new("name", "otel")]),
            Attribute::array("items", [AttrValue::from("apple"), AttrValue::from("pear")]),
        ]),
    );

    // Through the `log` crate.
    let bridge = OpenTelemetryLogBridge::new(&provider);
    log::set_boxed_logger(Box::new(bridge)).expect("logger is set only once");
    log::set_max_level(LogLevel::Info.to_level_filter());

    info!(target: "my-system", event_id = 20, user_name = "otel"; "hello from {}", "log");
    error!(user_email = "otel@opentelemetry.io"; "checkout failed");

    let _ = provider.shutdown();
}
