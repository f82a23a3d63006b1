// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

use super::{DisplayPreference, TracingConfig, TracingScope, WriterConfig};
use crate::{CallbackError, CommonResult};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
#[macro_export]
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(false)
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Installs a subscriber built from `tracing_config`. Logging is **disabled** by default:
/// nothing this crate emits is visible until this (or some other subscriber setup) is
/// called.
///
/// - Returns `Ok(None)` if the level filter is [`LevelFilter::OFF`]. Nothing is installed.
/// - [`TracingScope::Global`] returns `Ok(None)` once installed. It stays installed for
///   the life of the process.
/// - [`TracingScope::ThreadLocal`] returns the [`DefaultGuard`]. The subscriber is
///   uninstalled when the guard is dropped.
///
/// # Errors
///
/// Returns [`CallbackError::TracingAlreadyInstalled`] if the scope is global and a global
/// subscriber already exists.
///
/// # Example
///
/// ```
/// use r3bl_callback::{Callback, TracingConfig, TracingScope, init_tracing};
///
/// let config = TracingConfig {
///     scope: TracingScope::ThreadLocal,
///     ..TracingConfig::default()
/// };
/// let _guard = init_tracing(config).unwrap();
///
/// let callback = Callback::<(), ()>::new();
/// callback.add(|_| ());
/// callback.emit(());
/// ```
pub fn init_tracing(
    tracing_config: impl Into<TracingConfig>,
) -> CommonResult<Option<DefaultGuard>> {
    let tracing_config: TracingConfig = tracing_config.into();

    // Early return if the level filter is off.
    if tracing_config.is_off() {
        return Ok(None);
    }

    match tracing_config.scope {
        TracingScope::Global => tracing_config.install_global().map(|()| None),
        TracingScope::ThreadLocal => tracing_config.install_thread_local().map(Some),
    }
}

impl TracingConfig {
    /// # Errors
    ///
    /// Returns [`CallbackError::TracingAlreadyInstalled`] if a global subscriber is
    /// already set.
    pub fn install_global(self) -> CommonResult<()> {
        let layers = try_create_layers(self)?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(CallbackError::TracingAlreadyInstalled)?;
        Ok(())
    }

    /// The subscriber is active on the calling thread until the returned guard drops.
    ///
    /// # Errors
    ///
    /// Returns the error from [`try_create_layers()`], if any.
    pub fn install_thread_local(self) -> CommonResult<DefaultGuard> {
        let layers = try_create_layers(self)?;
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(tracing::subscriber::set_default(subscriber))
    }
}

/// Returns the layers. This does not initialize the tracing system. Don't forget to do
/// this manually, by calling `init` on the returned layers.
///
/// For example, once you have the layers, you can run the following:
/// `try_create_layers(..).map(|layers|
/// tracing_subscriber::registry().with(layers).init());`
///
/// Returns `None` if the level filter is [`LevelFilter::OFF`].
///
/// # Errors
///
/// Returns the error from [`try_create_display_layer()`], if any.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> CommonResult<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    if tracing_config.is_off() {
        return Ok(None);
    }

    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Set the level filter from the tracing configuration. This is needed if more layers
    // are added that don't have a level filter of their own.
    return_it.push(Box::new(tracing_config.get_level_filter()));

    if let Some(layer) = try_create_display_layer(
        tracing_config.get_level_filter(),
        tracing_config.get_writer_config(),
    )? {
        return_it.push(layer);
    }

    Ok(Some(return_it))
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// This is useful for composition of layers. There's more info in the docs
/// [here](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/index.html#runtime-configuration-with-layers).
///
/// # Errors
///
/// Infallible for the writers supported today. The [`Result`] leaves room for writers
/// that need to acquire a resource (eg: a file).
#[allow(clippy::unnecessary_wraps)]
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> CommonResult<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    // Shared configuration regardless of where logs are output to.
    let fmt_layer = create_fmt!();

    // Configure the writer based on the desired log target, and return it.
    Ok(match writer_config {
        WriterConfig::Display(DisplayPreference::Stdout) => Some(Box::new(
            fmt_layer
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        )),
        WriterConfig::Display(DisplayPreference::Stderr) => Some(Box::new(
            fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        )),
        WriterConfig::None => None,
    })
}
