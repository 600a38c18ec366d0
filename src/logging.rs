//! Logger setup.
//!
//! Records go through `pretty_env_logger` as usual, except while the TUI owns
//! the terminal: then they are parked in [`crate::stderr_buffer`] and printed
//! once the terminal is restored.

use log::{LevelFilter, Log, Metadata, Record};

struct BufferedLogger {
    inner: Box<dyn Log>,
}

impl Log for BufferedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }
        if crate::stderr_buffer::is_active() {
            crate::stderr_buffer::warn(format!(
                "{:<5} {} > {}",
                record.level(),
                record.target(),
                record.args()
            ));
        } else {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `debug`, and the
/// default is `warn`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Warn
            };
            builder.filter_level(level);
        }
    }

    let logger = builder.build();
    let level = logger.filter();

    let wrapped = BufferedLogger {
        inner: Box::new(logger),
    };
    if log::set_boxed_logger(Box::new(wrapped)).is_ok() {
        log::set_max_level(level);
    }
}
