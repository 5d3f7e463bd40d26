//! What the terminal can show, resolved once per command.

use std::io::IsTerminal;

use chrono_tz::Tz;

use super::mode::OutputMode;

const FALLBACK_WIDTH: usize = 80;

/// Rendering decisions shared by every printer in the CLI.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub is_tty: bool,
    pub color: bool,
    /// Box drawing and symbols; `--ascii` turns them off
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
    /// Zone for pretty timestamps, from `[ui] timezone`
    pub timezone: Tz,
}

/// Environment facts read before any flag is applied.
struct Terminal {
    stdout_tty: bool,
    dumb: bool,
    no_color: bool,
}

impl Terminal {
    fn detect() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            dumb: std::env::var("TERM").is_ok_and(|term| term == "dumb"),
            no_color: std::env::var_os("NO_COLOR").is_some(),
        }
    }
}

impl UiContext {
    /// Build from the environment plus the per-command `--json`/`--format`
    /// and the global `--no-color`/`--ascii` flags.
    pub fn from_env(
        json_flag: bool,
        format_flag: Option<&str>,
        no_color_flag: bool,
        ascii_flag: bool,
    ) -> Self {
        let terminal = Terminal::detect();
        let mode = OutputMode::resolve(json_flag, format_flag, terminal.stdout_tty, terminal.dumb);
        let color = terminal.stdout_tty && !(no_color_flag || terminal.no_color || terminal.dumb);

        Self {
            is_tty: terminal.stdout_tty,
            color,
            unicode: !ascii_flag,
            width: columns_from_env()
                .or_else(columns_from_tty)
                .unwrap_or(FALLBACK_WIDTH),
            mode,
            timezone: Tz::UTC,
        }
    }

    pub fn with_timezone(self, timezone: Tz) -> Self {
        Self { timezone, ..self }
    }
}

fn columns_from_env() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()?
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&cols| cols > 0)
}

#[cfg(unix)]
fn columns_from_tty() -> Option<usize> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let ptr: *mut libc::winsize = &mut size;
    // SAFETY: TIOCGWINSZ writes a winsize into the pointer it is given
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, ptr) };
    (rc == 0 && size.ws_col > 0).then_some(usize::from(size.ws_col))
}

#[cfg(not(unix))]
fn columns_from_tty() -> Option<usize> {
    None
}
