//! Leveled, colorized status lines on stderr.
//!
//! stdout carries the JSON response, so everything here goes to stderr and only
//! when stderr is a terminal (same rule as `log_status!`).

use std::io::{self, IsTerminal};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
    Warning,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Success => "SUCCESS",
            Level::Error => "ERROR",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Level::Success => GREEN,
            Level::Error => RED,
            Level::Info => BLUE,
            Level::Warning => YELLOW,
        }
    }
}

pub fn format_line(level: Level, message: &str, color: bool) -> String {
    if color {
        format!("{}[{}]{} {}", level.color(), level.label(), RESET, message)
    } else {
        format!("[{}] {}", level.label(), message)
    }
}

fn stderr_is_terminal() -> bool {
    io::stderr().is_terminal()
}

/// Colors are disabled by `NO_COLOR` (any value).
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn emit(level: Level, message: &str) {
    if stderr_is_terminal() {
        eprintln!("{}", format_line(level, message, colors_enabled()));
    }
}

/// Raw multi-line block, e.g. the missing-requirements table.
pub fn block(text: &str) {
    if stderr_is_terminal() {
        eprintln!("{}", text);
    }
}

pub fn success(message: impl AsRef<str>) {
    emit(Level::Success, message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    emit(Level::Error, message.as_ref());
}

pub fn info(message: impl AsRef<str>) {
    emit(Level::Info, message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    emit(Level::Warning, message.as_ref());
}
