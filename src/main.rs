mod commands;
mod render;
mod session;

use std::path::{Path, PathBuf};

use anyhow::Result;

use quill_config::Config;
use quill_logger::LogLevel;
use quill_term::Terminal;
use quill_theme::Theme;

use session::Session;

fn main() -> Result<()> {
    // Load config first; a broken config file falls back to defaults
    let config = Config::load().unwrap_or_default();

    let log_path = config
        .logging
        .file_path
        .clone()
        .map(PathBuf::from)
        .or_else(|| Config::default_log_path().ok())
        .unwrap_or_else(|| PathBuf::from("quill.log"));
    let log_level = config
        .logging
        .min_level
        .parse()
        .unwrap_or(LogLevel::Info);
    quill_logger::init(log_path, log_level);

    let theme = load_initial_theme(&config.general.theme);

    // Terminal acquisition failure is unrecoverable: the error propagates
    // and the process exits non-zero
    let mut terminal = Terminal::new()?;
    let (width, height) = terminal.size()?;

    let mut session = Session::new(config, theme, width, height);
    if let Some(path) = std::env::args().nth(1) {
        session.open_path(Path::new(&path));
    }

    loop {
        let frame = render::compose(&mut session);
        terminal.write_frame(&frame)?;

        let event = terminal.read_event()?;
        session.handle_event(event)?;
        if session.should_exit {
            break;
        }
    }

    quill_logger::info("clean exit");
    Ok(())
}

/// Configured theme from the theme file, or the built-in fallback.
fn load_initial_theme(name: &str) -> Theme {
    let found = Config::theme_file_path()
        .ok()
        .and_then(|path| std::fs::read(path).ok())
        .and_then(|data| quill_theme::lookup(&data, name).ok().flatten());

    match found {
        Some(theme) => theme,
        None => {
            if name != Theme::builtin().name {
                quill_logger::warn(format!("theme '{name}' not found, using built-in"));
            }
            Theme::builtin()
        }
    }
}
