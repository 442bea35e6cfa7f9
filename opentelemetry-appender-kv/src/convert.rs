//! Flattening of source attributes into OpenTelemetry key/values.
//!
//! Conversion never fails. Groups are spliced into the output with dotted
//! keys, values without a matching OpenTelemetry type degrade to strings, and
//! errors become `exception.message`.
use std::time::SystemTime;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, Utc};
use opentelemetry::{Array, Key, KeyValue, StringValue, Value};
use opentelemetry_semantic_conventions::attribute::EXCEPTION_MESSAGE;

use crate::attribute::{prefixed_key, AttrValue, Attribute};

/// Convert one attribute into zero or more OpenTelemetry key/values.
pub fn to_otel_attributes(attr: &Attribute) -> Vec<KeyValue> {
    let mut out = Vec::new();
    append_attribute(&mut out, &attr.key, &attr.value);
    out
}

pub(crate) fn append_attribute(out: &mut Vec<KeyValue>, key: &Key, value: &AttrValue) {
    match value {
        AttrValue::Bool(v) => out.push(KeyValue::new(key.clone(), *v)),
        AttrValue::I64(v) => out.push(KeyValue::new(key.clone(), *v)),
        // Reinterpreted; magnitudes >= 2^63 come out negative.
        AttrValue::U64(v) => out.push(KeyValue::new(key.clone(), *v as i64)),
        AttrValue::F64(v) => out.push(KeyValue::new(key.clone(), *v)),
        AttrValue::String(v) => out.push(KeyValue::new(key.clone(), v.clone())),
        AttrValue::Duration(v) => out.push(KeyValue::new(key.clone(), v.as_secs_f64())),
        AttrValue::Time { at, offset } => {
            out.push(KeyValue::new(key.clone(), unix_seconds(*at, *offset)))
        }
        AttrValue::Binary(v) => out.push(KeyValue::new(key.clone(), STANDARD.encode(v))),
        AttrValue::ByteString(v) => out.push(KeyValue::new(
            key.clone(),
            String::from_utf8_lossy(v).into_owned(),
        )),
        AttrValue::Array(values) => append_array(out, key, values),
        AttrValue::Group(attrs) => {
            let prefix = format!("{}.", key.as_str());
            for attr in attrs {
                append_attribute(out, &prefixed_key(&prefix, &attr.key), &attr.value);
            }
        }
        AttrValue::Error(Some(err)) => out.push(KeyValue::new(EXCEPTION_MESSAGE, err.to_string())),
        AttrValue::Error(None) | AttrValue::Skip => {}
        AttrValue::Display(Some(v)) => out.push(KeyValue::new(key.clone(), v.to_string())),
        AttrValue::Display(None) => out.push(KeyValue::new(key.clone(), "<nil>")),
        AttrValue::Debug(v) => out.push(KeyValue::new(key.clone(), format!("{v:?}"))),
    }
}

fn unix_seconds(at: SystemTime, offset: Option<FixedOffset>) -> i64 {
    let utc = DateTime::<Utc>::from(at);
    match offset {
        Some(offset) => utc.with_timezone(&offset).timestamp(),
        None => utc.timestamp(),
    }
}

fn append_array(out: &mut Vec<KeyValue>, key: &Key, values: &[AttrValue]) {
    if let Some(array) = homogeneous_array(values) {
        out.push(KeyValue::new(key.clone(), Value::Array(array)));
        return;
    }
    for value in values {
        out.push(KeyValue::new(key.clone(), value.to_string()));
    }
}

fn homogeneous_array(values: &[AttrValue]) -> Option<Array> {
    match values.first() {
        None => Some(Array::String(Vec::new())),
        Some(AttrValue::String(_)) => values
            .iter()
            .map(|v| match v {
                AttrValue::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect::<Option<Vec<StringValue>>>()
            .map(Array::String),
        Some(AttrValue::I64(_)) => values
            .iter()
            .map(|v| match v {
                AttrValue::I64(i) => Some(*i),
                _ => None,
            })
            .collect::<Option<Vec<i64>>>()
            .map(Array::I64),
        Some(AttrValue::Bool(_)) => values
            .iter()
            .map(|v| match v {
                AttrValue::Bool(b) => Some(*b),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()
            .map(Array::Bool),
        Some(_) => None,
    }
}
