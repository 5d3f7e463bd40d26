//! Output mode selection.

/// How a command presents its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One JSON document on stdout
    Json,
    /// `key=value` and tab-separated rows, stable for scripts
    #[default]
    Plain,
    /// Colors, tables and zone-local times for an operator at a terminal
    Pretty,
}

impl OutputMode {
    /// Pick a mode. An explicit request beats terminal detection.
    ///
    /// `format` accepts `json`, `plain`, `pretty` or `table`; anything else
    /// falls through to detection. A dumb terminal never gets pretty output.
    pub fn resolve(
        json_flag: bool,
        format_flag: Option<&str>,
        is_tty: bool,
        term_is_dumb: bool,
    ) -> Self {
        let requested = match format_flag.map(str::to_ascii_lowercase).as_deref() {
            _ if json_flag => Some(Self::Json),
            Some("json") => Some(Self::Json),
            Some("plain") => Some(Self::Plain),
            Some("pretty") | Some("table") => Some(Self::Pretty),
            _ => None,
        };
        let detected = if is_tty { Self::Pretty } else { Self::Plain };

        match requested.unwrap_or(detected) {
            Self::Pretty if term_is_dumb => Self::Plain,
            mode => mode,
        }
    }

    pub fn is_json(&self) -> bool {
        *self == Self::Json
    }

    pub fn is_pretty(&self) -> bool {
        *self == Self::Pretty
    }
}
