// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};
use miette::IntoDiagnostic as _;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt as _, registry::LookupSpan,
                         util::SubscriberInitExt as _};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
#[macro_export]
macro_rules! create_fmt {
    (ansi: $ansi:expr) => {
        tracing_subscriber::fmt::layer()
            .with_ansi($ansi)
            .event_format($crate::CustomEventFormatter::new($ansi))
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Returns the layers. This does not initialize the tracing system, use
/// [`TracingConfig::install_global`] or [`TracingConfig::install_thread_local`] for that.
///
/// Returns `None` if logging is disabled by the configuration.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    if tracing_config.is_disabled() {
        return Ok(None);
    }

    let level_filter = tracing_config.get_level_filter();
    let mut return_it: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    // Set the level filter for any layers added later that don't have one.
    return_it.push(Box::new(level_filter));

    if let Some(layer) =
        try_create_display_layer(level_filter, &tracing_config.get_writer_config())
    {
        return_it.push(layer);
    }

    if let Some(layer) =
        try_create_file_layer(level_filter, &tracing_config.get_writer_config())?
    {
        return_it.push(layer);
    }

    Ok(Some(return_it))
}

/// This erases the concrete type of the writer, and returns a boxed layer.
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: &WriterConfig,
) -> Option<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!(ansi: true);

    match writer_config {
        WriterConfig::DisplayAndFile(display_pref, _)
        | WriterConfig::Display(display_pref) => match display_pref {
            DisplayPreference::Stdout => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stdout)
                    .with_filter(level_filter),
            )),
            DisplayPreference::Stderr => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stderr)
                    .with_filter(level_filter),
            )),
        },
        WriterConfig::None | WriterConfig::File(_) => None,
    }
}

/// This erases the concrete type of the writer, and returns a boxed layer.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: &WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!(ansi: false);

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(_, log_file_path) | WriterConfig::File(log_file_path) => {
            let file = rolling_file_appender_impl::try_create(log_file_path.as_str())?;
            Some(Box::new(
                fmt_layer.with_writer(file).with_filter(level_filter),
            ))
        }
        WriterConfig::None | WriterConfig::Display(_) => None,
    })
}

impl TracingConfig {
    /// Global default subscriber, which once set, can't be unset or changed. This is
    /// great for apps. It is a no-op if logging is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the layers can't be created, or a global subscriber has
    /// already been installed.
    pub fn install_global(&self) -> miette::Result<()> {
        let Some(layers) = try_create_layers(self)? else {
            return Ok(());
        };
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .into_diagnostic()
    }

    /// Thread local subscriber, which you can assign per thread. This is great for
    /// tests. Logging stops when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the layers can't be created.
    pub fn install_thread_local(
        &self,
    ) -> miette::Result<Option<tracing::subscriber::DefaultGuard>> {
        let Some(layers) = try_create_layers(self)? else {
            return Ok(None);
        };
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(Some(tracing::subscriber::set_default(subscriber)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_log_file(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("r3bl_term_runtime_{}_{name}", std::process::id()))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_disabled_config_creates_no_layers() {
        let layers = try_create_layers(&TracingConfig::default()).unwrap();
        assert!(layers.is_none());
    }

    #[test]
    fn test_try_create_display_layer() {
        let layer: Option<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_display_layer(
                LevelFilter::DEBUG,
                &WriterConfig::Display(DisplayPreference::Stderr),
            );
        assert!(layer.is_some());
    }

    #[test]
    fn test_try_create_both_layers() {
        let file_path = temp_log_file("both.log");
        let tracing_config = TracingConfig {
            writer_config: WriterConfig::DisplayAndFile(
                DisplayPreference::Stderr,
                file_path.clone(),
            ),
            level_filter: LevelFilter::DEBUG,
        };

        let layers = try_create_layers(&tracing_config).unwrap().unwrap();

        // Level filter + display + file.
        assert_eq!(layers.len(), 3);
        drop(std::fs::remove_file(file_path));
    }

    #[test]
    fn test_thread_local_file_logging_writes_message() {
        let file_path = temp_log_file("thread_local.log");
        let guard = TracingConfig::new_file(Some(file_path.clone()), LevelFilter::DEBUG)
            .install_thread_local()
            .unwrap();

        tracing::debug!(message = "hello from test", answer = 42);
        drop(guard);

        let contents = std::fs::read_to_string(&file_path).unwrap();
        assert!(contents.contains("hello from test"));
        assert!(contents.contains("answer: 42"));
        drop(std::fs::remove_file(file_path));
    }
}
