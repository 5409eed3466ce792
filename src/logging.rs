//! Console-backed `log` implementation.
//!
//! In the browser every record goes to the matching `console.*` method so
//! warnings show up in the page's devtools. Native builds (tests, tooling)
//! write to stderr instead.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[sticky-vocab] {}", record.args());
        emit(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(level: Level, line: &str) {
    eprintln!("{:<5} {}", level, line);
}

/// Install the console logger and set the max level.
///
/// A content script can be injected twice into the same page; the second
/// call keeps the logger from the first and only adjusts the level.
pub fn init_logging(level: LevelFilter) {
    log::set_max_level(level);
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("console logger already installed");
    }
}

/// Parse a level name coming from JS config ("warn", "debug", ...)
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}
