use std::sync::Arc;

use opentelemetry::Key;

use crate::attribute::{prefixed_key, Attribute};
use crate::level::Level;

/// Accumulated context for one logger derivation.
///
/// A `HandlerState` is never modified once built. [`with_attrs`] and
/// [`with_group`] return a new state and leave the receiver untouched, so a
/// state can be shared between threads and derived from concurrently.
///
/// Attributes are stored with the group prefix that was active when they were
/// added. Opening a group later does not touch them.
///
/// [`with_attrs`]: HandlerState::with_attrs
/// [`with_group`]: HandlerState::with_group
#[derive(Clone, Debug)]
pub struct HandlerState {
    attrs: Arc<[Attribute]>,
    group_prefix: Arc<str>,
    min_level: Level,
    include_baggage: bool,
}

impl HandlerState {
    /// A root state with no attributes and no open group.
    pub fn new(min_level: Level, include_baggage: bool) -> Self {
        HandlerState {
            attrs: Arc::new([]),
            group_prefix: Arc::from(""),
            min_level,
            include_baggage,
        }
    }

    /// Attributes accumulated so far, already prefixed.
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// The active group prefix; empty or ending with `.`.
    pub fn group_prefix(&self) -> &str {
        &self.group_prefix
    }

    /// Minimum level accepted by [`enabled`](HandlerState::enabled).
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Whether baggage members are copied into every record.
    pub fn include_baggage(&self) -> bool {
        self.include_baggage
    }

    /// Whether a record at `level` passes the level gate.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// A new state with `attrs` appended, each prefixed with the current
    /// group prefix.
    pub fn with_attrs<I>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        let attrs = attrs.into_iter();
        let mut combined = Vec::with_capacity(self.attrs.len() + attrs.size_hint().0);
        combined.extend_from_slice(&self.attrs);
        combined.extend(attrs.map(|attr| attr.with_key_prefix(&self.group_prefix)));
        HandlerState {
            attrs: combined.into(),
            ..self.clone()
        }
    }

    /// A new state with `name` appended to the group prefix. An empty name
    /// returns an identical state.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        HandlerState {
            group_prefix: Arc::from(format!("{}{name}.", self.group_prefix)),
            ..self.clone()
        }
    }

    /// `key` as it would be stored if logged against this state.
    pub(crate) fn prefixed(&self, key: &Key) -> Key {
        if self.group_prefix.is_empty() {
            key.clone()
        } else {
            prefixed_key(&self.group_prefix, key)
        }
    }
}

impl Default for HandlerState {
    fn default() -> Self {
        HandlerState::new(Level::INFO, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(state: &HandlerState) -> Vec<&str> {
        state.attrs().iter().map(|a| a.key().as_str()).collect()
    }

    #[test]
    fn root_state_is_empty() {
        let state = HandlerState::default();
        assert!(state.attrs().is_empty());
        assert_eq!(state.group_prefix(), "");
        assert_eq!(state.min_level(), Level::INFO);
        assert!(!state.include_baggage());
    }

    #[test]
    fn attrs_before_group_keep_their_keys() {
        let state = HandlerState::default()
            .with_attrs([Attribute::new("first", "value1")])
            .with_group("group1")
            .with_attrs([Attribute::new("second", "value2")])
            .with_group("group2");

        assert_eq!(keys(&state), ["first", "group1.second"]);
        assert_eq!(state.group_prefix(), "group1.group2.");
        assert_eq!(state.prefixed(&Key::new("k")).as_str(), "group1.group2.k");
    }

    #[test]
    fn empty_group_name_is_a_no_op() {
        let state = HandlerState::default().with_group("g");
        let same = state.with_group("");
        assert_eq!(same.group_prefix(), "g.");
        assert_eq!(
            same.with_attrs([Attribute::new("k", 1)]).attrs()[0]
                .key()
                .as_str(),
            "g.k"
        );
    }

    #[test]
    fn derivation_leaves_parent_untouched() {
        let parent = HandlerState::default().with_attrs([Attribute::new("p", 1)]);
        let left = parent.with_attrs([Attribute::new("l", 2)]);
        let right = parent.with_group("r").with_attrs([Attribute::new("x", 3)]);

        assert_eq!(keys(&parent), ["p"]);
        assert_eq!(parent.group_prefix(), "");
        assert_eq!(keys(&left), ["p", "l"]);
        assert_eq!(keys(&right), ["p", "r.x"]);
    }

    #[test]
    fn derivation_carries_level_and_baggage_flag() {
        let state = HandlerState::new(Level::WARN, true)
            .with_attrs([Attribute::new("a", true)])
            .with_group("g");
        assert_eq!(state.min_level(), Level::WARN);
        assert!(state.include_baggage());
    }

    #[test]
    fn level_gate() {
        let state = HandlerState::new(Level::WARN, false);
        assert!(!state.enabled(Level::INFO));
        assert!(state.enabled(Level::WARN));
        assert!(state.enabled(Level::ERROR));

        let state = HandlerState::default();
        assert!(!state.enabled(Level::DEBUG));
        assert!(state.enabled(Level::INFO));
    }

    #[test]
    fn states_are_shareable_across_threads() {
        let state = HandlerState::default().with_attrs([Attribute::new("shared", 1)]);
        let handles: Vec<_> = (0..4_i64)
            .map(|i| {
                let state = state.clone();
                std::thread::spawn(move || {
                    state
                        .with_group(&format!("t{i}"))
                        .with_attrs([Attribute::new("k", i)])
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let derived = handle.join().expect("thread panicked");
            assert_eq!(keys(&derived), ["shared".to_string(), format!("t{i}.k")]);
        }
        assert_eq!(keys(&state), ["shared"]);
    }
}
