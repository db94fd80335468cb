use anyhow::Result;
use std::{
    fs,
    io::{stderr, IsTerminal},
};
use tracing_appender::rolling;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::debug_fn},
    prelude::*,
    registry, EnvFilter,
};

use super::{
    consts::{DEFAULT_LOG_LEVEL, LOG_FILE},
    project_dirs,
};

/// Log to stderr and, down to `debug`, as JSON lines in the data directory.
///
/// The console level comes from `RUST_LOG` when set, otherwise from `verbosity`: `info`, then
/// `debug` for `-v` and `trace` for `-vv`.
pub fn init_logger(verbosity: u8) -> Result<()> {
    let project_dirs = project_dirs()?;
    let directory = project_dirs.data_dir();
    fs::create_dir_all(directory)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    let file_appender = rolling::never(directory, LOG_FILE);

    let console_layer = fmt::layer()
        .with_writer(stderr)
        .with_ansi(IsTerminal::is_terminal(&stderr()))
        .with_level(true)
        .without_time()
        .compact()
        .fmt_fields({
            debug_fn(move |writer, field, value| {
                match field.name() {
                    "message" => write!(writer, "{:?}", value),
                    name if name.starts_with("log.") => Ok(()),
                    name => write!(writer, " {}={:?}", name, value),
                }
            })
        })
        .with_filter(env_filter);

    let json_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_target(true)
        .with_level(true)
        .flatten_event(true)
        .with_current_span(false)
        .with_filter(LevelFilter::DEBUG);

    registry().with(console_layer).with(json_layer).init();

    Ok(())
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_LOG_LEVEL,
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_default_level() {
        assert_eq!(default_level(0), "info");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(5), "trace");
    }
}
