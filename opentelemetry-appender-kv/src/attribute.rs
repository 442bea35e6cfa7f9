//! Structured attributes as handed over by the source logger.
//!
//! [`AttrValue`] is a closed set of value kinds. Anything the source logger
//! cannot express through one of the typed variants is carried as
//! [`AttrValue::Debug`] and later rendered as text.
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, Utc};
use opentelemetry::{Key, StringValue};

/// A key plus a typed value attached to a log record.
#[derive(Clone, Debug)]
pub struct Attribute {
    pub(crate) key: Key,
    pub(crate) value: AttrValue,
}

impl Attribute {
    /// Create an attribute from anything convertible into an [`AttrValue`].
    pub fn new(key: impl Into<Key>, value: impl Into<AttrValue>) -> Self {
        Attribute {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A named group whose children are flattened into `key.child` entries.
    pub fn group(key: impl Into<Key>, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        Attribute::new(key, AttrValue::Group(attrs.into_iter().collect()))
    }

    /// An array of values. Homogeneous string, integer and boolean arrays are
    /// kept as slices.
    pub fn array(key: impl Into<Key>, values: impl IntoIterator<Item = AttrValue>) -> Self {
        Attribute::new(key, AttrValue::Array(values.into_iter().collect()))
    }

    /// Raw bytes, exported as base64 text.
    pub fn binary(key: impl Into<Key>, bytes: impl Into<Vec<u8>>) -> Self {
        Attribute::new(key, AttrValue::Binary(bytes.into()))
    }

    /// Bytes holding text, exported as-is.
    pub fn byte_string(key: impl Into<Key>, bytes: impl Into<Vec<u8>>) -> Self {
        Attribute::new(key, AttrValue::ByteString(bytes.into()))
    }

    /// A point in time with an optional UTC offset.
    pub fn time(key: impl Into<Key>, at: SystemTime, offset: Option<FixedOffset>) -> Self {
        Attribute::new(key, AttrValue::Time { at, offset })
    }

    /// An error. Exported as `exception.message`; the key is not used.
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Attribute::new("error", AttrValue::Error(Some(Arc::new(err))))
    }

    /// An attribute whose error may be absent. `None` exports nothing.
    pub fn maybe_error(key: impl Into<Key>, err: Option<Arc<dyn Error + Send + Sync>>) -> Self {
        Attribute::new(key, AttrValue::Error(err))
    }

    /// A value rendered through its [`fmt::Display`] implementation.
    pub fn display<T>(key: impl Into<Key>, value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Attribute::new(key, AttrValue::Display(Some(Arc::new(value))))
    }

    /// A value the adapter has no dedicated kind for.
    pub fn debug<T>(key: impl Into<Key>, value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Attribute::new(key, AttrValue::Debug(Arc::new(value)))
    }

    /// A placeholder that exports nothing.
    pub fn skip() -> Self {
        Attribute::new("", AttrValue::Skip)
    }

    /// The attribute key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The attribute value.
    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    pub(crate) fn with_key_prefix(mut self, prefix: &str) -> Self {
        if !prefix.is_empty() {
            self.key = prefixed_key(prefix, &self.key);
        }
        self
    }
}

pub(crate) fn prefixed_key(prefix: &str, key: &Key) -> Key {
    Key::from(format!("{prefix}{}", key.as_str()))
}

/// The typed value of an [`Attribute`].
#[derive(Clone)]
pub enum AttrValue {
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 64-bit integer. Values at or above 2^63 wrap to negative
    /// numbers when exported.
    U64(u64),
    /// A 64-bit float.
    F64(f64),
    /// A string.
    String(StringValue),
    /// A duration, exported as floating-point seconds.
    Duration(Duration),
    /// A point in time, exported as Unix seconds.
    Time {
        /// The instant.
        at: SystemTime,
        /// The offset the instant was observed in. UTC if absent.
        offset: Option<FixedOffset>,
    },
    /// Raw bytes, exported as base64.
    Binary(Vec<u8>),
    /// Bytes holding text.
    ByteString(Vec<u8>),
    /// A sequence of values.
    Array(Vec<AttrValue>),
    /// A named group of attributes.
    Group(Vec<Attribute>),
    /// An error, possibly absent.
    Error(Option<Arc<dyn Error + Send + Sync>>),
    /// Exports nothing.
    Skip,
    /// A value with a textual rendering, possibly absent.
    Display(Option<Arc<dyn fmt::Display + Send + Sync>>),
    /// Any other value, rendered through `Debug`.
    Debug(Arc<dyn fmt::Debug + Send + Sync>),
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            AttrValue::I64(v) => f.debug_tuple("I64").field(v).finish(),
            AttrValue::U64(v) => f.debug_tuple("U64").field(v).finish(),
            AttrValue::F64(v) => f.debug_tuple("F64").field(v).finish(),
            AttrValue::String(v) => f.debug_tuple("String").field(&v.as_str()).finish(),
            AttrValue::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            AttrValue::Time { at, offset } => f
                .debug_struct("Time")
                .field("at", at)
                .field("offset", offset)
                .finish(),
            AttrValue::Binary(v) => f.debug_tuple("Binary").field(v).finish(),
            AttrValue::ByteString(v) => f.debug_tuple("ByteString").field(v).finish(),
            AttrValue::Array(v) => f.debug_tuple("Array").field(v).finish(),
            AttrValue::Group(v) => f.debug_tuple("Group").field(v).finish(),
            AttrValue::Error(v) => f.debug_tuple("Error").field(v).finish(),
            AttrValue::Skip => f.write_str("Skip"),
            AttrValue::Display(v) => f
                .debug_tuple("Display")
                .field(&v.as_ref().map(|d| d.to_string()))
                .finish(),
            AttrValue::Debug(v) => f.debug_tuple("Debug").field(v).finish(),
        }
    }
}

/// The text form of a value. Used wherever a value has to degrade to a
/// string attribute.
impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::I64(v) => write!(f, "{v}"),
            AttrValue::U64(v) => write!(f, "{v}"),
            AttrValue::F64(v) => write!(f, "{v}"),
            AttrValue::String(v) => f.write_str(v.as_str()),
            AttrValue::Duration(v) => write!(f, "{v:?}"),
            AttrValue::Time { at, offset } => {
                let utc = DateTime::<Utc>::from(*at);
                match offset {
                    Some(offset) => f.write_str(&utc.with_timezone(offset).to_rfc3339()),
                    None => f.write_str(&utc.to_rfc3339()),
                }
            }
            AttrValue::Binary(v) => f.write_str(&STANDARD.encode(v)),
            AttrValue::ByteString(v) => f.write_str(&String::from_utf8_lossy(v)),
            AttrValue::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            AttrValue::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key.as_str(), attr.value)?;
                }
                f.write_str("]")
            }
            AttrValue::Error(Some(err)) => write!(f, "{err}"),
            AttrValue::Error(None) | AttrValue::Display(None) => f.write_str("<nil>"),
            AttrValue::Skip => Ok(()),
            AttrValue::Display(Some(v)) => write!(f, "{v}"),
            AttrValue::Debug(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from {
    ($t:ty, $variant:path) => {
        impl From<$t> for AttrValue {
            fn from(val: $t) -> AttrValue {
                $variant(val.into())
            }
        }
    };
}

impl_from!(bool, AttrValue::Bool);
impl_from!(i8, AttrValue::I64);
impl_from!(i16, AttrValue::I64);
impl_from!(i32, AttrValue::I64);
impl_from!(i64, AttrValue::I64);
impl_from!(u8, AttrValue::U64);
impl_from!(u16, AttrValue::U64);
impl_from!(u32, AttrValue::U64);
impl_from!(u64, AttrValue::U64);
impl_from!(f32, AttrValue::F64);
impl_from!(f64, AttrValue::F64);
impl_from!(&'static str, AttrValue::String);
impl_from!(String, AttrValue::String);
impl_from!(StringValue, AttrValue::String);
impl_from!(Duration, AttrValue::Duration);

impl From<SystemTime> for AttrValue {
    fn from(at: SystemTime) -> AttrValue {
        AttrValue::Time { at, offset: None }
    }
}

impl From<DateTime<FixedOffset>> for AttrValue {
    fn from(at: DateTime<FixedOffset>) -> AttrValue {
        AttrValue::Time {
            at: at.with_timezone(&Utc).into(),
            offset: Some(*at.offset()),
        }
    }
}
