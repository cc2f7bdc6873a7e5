use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use chrono::Local;

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

struct Logger {
    file: Option<File>,
    echo: bool,
    prefixes: HashMap<String, u8>, // prefix -> color index
}

// Color indices for terminal echo
pub const COLOR_GRAY: u8 = 1;
pub const COLOR_BLUE: u8 = 2;

/// Initialize the global logger. Clears `<log_dir>/app.log`.
///
/// If the log file cannot be opened the logger still accepts calls and
/// only echoes (when enabled).
pub fn init(log_dir: &Path) {
    fs::create_dir_all(log_dir).ok();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_dir.join("app.log"))
        .ok();

    let logger = LOGGER.get_or_init(|| {
        Mutex::new(Logger { file: None, echo: false, prefixes: HashMap::new() })
    });
    if let Ok(mut l) = logger.lock() {
        l.file = file;
    }
}

/// Mirror every line to stderr.
pub fn set_echo(echo: bool) {
    let logger = LOGGER.get_or_init(|| {
        Mutex::new(Logger { file: None, echo: false, prefixes: HashMap::new() })
    });
    if let Ok(mut l) = logger.lock() {
        l.echo = echo;
    }
}

/// Register a prefix with a color used when echoing.
pub fn register_prefix(prefix: &str, color: u8) {
    if let Some(logger) = LOGGER.get() {
        if let Ok(mut l) = logger.lock() {
            l.prefixes.insert(prefix.to_string(), color);
        }
    }
}

fn ansi(color: u8) -> &'static str {
    match color {
        COLOR_GRAY => "\x1b[90m",
        COLOR_BLUE => "\x1b[94m",
        _ => "",
    }
}

fn write_log(level: &str, prefix: &str, msg: &str) {
    let Some(logger) = LOGGER.get() else { return };
    let Ok(mut l) = logger.lock() else { return };

    let ts = Local::now().format("%H:%M:%S").to_string();
    let line = if prefix.is_empty() {
        format!("[{}] [{}] {}", ts, level, msg)
    } else {
        format!("[{}] [{}] [{}] {}", ts, level, prefix, msg)
    };

    if let Some(file) = l.file.as_mut() {
        writeln!(file, "{}", line).ok();
    }

    if l.echo {
        let color = l.prefixes.get(prefix).copied().unwrap_or(0);
        let level_tag = match level {
            "ERROR" => "\x1b[31merror\x1b[0m ",
            "WARN" => "\x1b[33mwarn\x1b[0m ",
            _ => "",
        };
        if prefix.is_empty() {
            eprintln!("{} {}{}", ts, level_tag, msg);
        } else {
            eprintln!("{} {}{}{}\x1b[0m {}", ts, level_tag, ansi(color), prefix, msg);
        }
    }
}

pub fn info(msg: &str) {
    write_log("INFO", "", msg);
}

pub fn warn(msg: &str) {
    write_log("WARN", "", msg);
}

pub fn error(msg: &str) {
    write_log("ERROR", "", msg);
}

pub fn info_p(prefix: &str, msg: &str) {
    write_log("INFO", prefix, msg);
}

pub fn warn_p(prefix: &str, msg: &str) {
    write_log("WARN", prefix, msg);
}

pub fn error_p(prefix: &str, msg: &str) {
    write_log("ERROR", prefix, msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_truncates_and_writes_prefixed_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.log"), "stale\n").unwrap();

        init(dir.path());
        register_prefix("hierarchy", COLOR_GRAY);
        warn_p("hierarchy", "skipped node");
        info("plain line");

        let text = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(!text.contains("stale"));
        assert!(text.contains("[WARN] [hierarchy] skipped node"));
        assert!(text.contains("[INFO] plain line"));
    }
}
