// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::Add;

use tracing_core::LevelFilter;

/// Configure where this crate's dispatch events are displayed, at what level, and
/// whether the subscriber is installed for the whole process or just the calling thread.
///
/// Use [`crate::init_tracing()`] to install it. Instead of building the struct by hand,
/// any of the following convert into it, and configs can be merged with `+`:
///
/// ```
/// use r3bl_callback::{DisplayPreference, TracingConfig, TracingScope};
/// use tracing_core::LevelFilter;
///
/// let level: TracingConfig = LevelFilter::TRACE.into();
/// let display: TracingConfig = DisplayPreference::Stderr.into();
/// let scope: TracingConfig = TracingScope::ThreadLocal.into();
///
/// let config = level + display + scope;
/// assert_eq!(config.level_filter, LevelFilter::TRACE);
/// assert_eq!(config.scope, TracingScope::ThreadLocal);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub level_filter: LevelFilter,
    pub writer_config: WriterConfig,
    pub scope: TracingScope,
}

/// - `None` builds no display layer (only the level filter is installed).
/// - `Display` writes compact lines to the preferred stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference /* Stdout, Stderr */),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

/// Global subscribers can be set once per process. Thread local ones are scoped to a
/// [`tracing::subscriber::DefaultGuard`], which makes them the right choice for tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingScope {
    #[default]
    Global,
    ThreadLocal,
}

impl Default for TracingConfig {
    /// Debug level, to stderr, global.
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::DEBUG,
            writer_config: WriterConfig::Display(DisplayPreference::Stderr),
            scope: TracingScope::Global,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    #[must_use]
    pub fn is_off(&self) -> bool { self.level_filter == LevelFilter::OFF }
}

/// Converts one knob into a full config, filling the rest in from
/// [`TracingConfig::default()`].
pub mod tracing_config_options {
    use super::{DisplayPreference, LevelFilter, TracingConfig, TracingScope,
                WriterConfig};

    impl From<tracing::Level> for TracingConfig {
        fn from(level: tracing::Level) -> Self {
            Self {
                level_filter: level.into(),
                ..Self::default()
            }
        }
    }

    impl From<LevelFilter> for TracingConfig {
        fn from(level_filter: LevelFilter) -> Self {
            Self {
                level_filter,
                ..Self::default()
            }
        }
    }

    impl From<DisplayPreference> for TracingConfig {
        fn from(preferred_display: DisplayPreference) -> Self {
            Self {
                writer_config: WriterConfig::Display(preferred_display),
                ..Self::default()
            }
        }
    }

    impl From<WriterConfig> for TracingConfig {
        fn from(writer_config: WriterConfig) -> Self {
            Self {
                writer_config,
                ..Self::default()
            }
        }
    }

    impl From<TracingScope> for TracingConfig {
        fn from(scope: TracingScope) -> Self {
            Self {
                scope,
                ..Self::default()
            }
        }
    }
}

/// Merge two [`TracingConfig`]s. The more verbose level filter wins. For the writer,
/// `rhs` wins unless it is [`WriterConfig::None`]. For the scope, `ThreadLocal` wins,
/// since it is the only one that can't clobber anyone else's subscriber.
impl Add<TracingConfig> for TracingConfig {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            level_filter: self.level_filter.max(rhs.level_filter),
            writer_config: self.writer_config + rhs.writer_config,
            scope: match (self.scope, rhs.scope) {
                (TracingScope::Global, TracingScope::Global) => TracingScope::Global,
                _ => TracingScope::ThreadLocal,
            },
        }
    }
}

/// `rhs` has higher specificity, so it clobbers `self`, unless it is `None`:
/// - `Display(a) + Display(b) = Display(b)`.
/// - `None + Display(b) = Display(b)`.
/// - `Display(a) + None = Display(a)`.
impl Add<WriterConfig> for WriterConfig {
    type Output = Self;

    fn add(self, rhs: WriterConfig) -> Self::Output {
        match (self, rhs) {
            (lhs, WriterConfig::None) => lhs,
            (_, rhs) => rhs,
        }
    }
}
