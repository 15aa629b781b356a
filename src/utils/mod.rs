// Shared helpers for the binary: tables, config files, log setup
pub mod table {
    // Helper to render a separator line
    fn sep(widths: &[usize]) -> String {
        let mut s = String::from("+");
        for w in widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let mut s = String::from("|");
        for (cell, &w) in cells.iter().zip(widths) {
            let len = cell.chars().count();
            s.push(' ');
            s.push_str(cell);
            if len < w {
                s.push_str(&" ".repeat(w - len));
            }
            s.push_str(" |");
        }
        s
    }

    /// Render an ASCII table given headers and rows. Widths count chars, so
    /// names with umlauts stay aligned; missing cells render empty.
    #[must_use]
    pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
        let cols = headers.len();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (c, w) in widths.iter_mut().enumerate() {
                *w = (*w).max(row.get(c).map_or(0, |s| s.chars().count()));
            }
        }

        let mut out = String::new();
        out.push_str(&sep(&widths));
        out.push('\n');
        let header_cells: Vec<String> = headers.iter().map(|s| (*s).to_string()).collect();
        out.push_str(&line(&header_cells, &widths));
        out.push('\n');
        out.push_str(&sep(&widths));
        out.push('\n');
        for row in rows {
            let cells: Vec<String> = (0..cols).map(|i| row.get(i).cloned().unwrap_or_default()).collect();
            out.push_str(&line(&cells, &widths));
            out.push('\n');
        }
        out.push_str(&sep(&widths));
        out
    }
}

pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// File name looked up by `load_config_near`.
    pub const CONFIG_FILE_NAME: &str = "concept-graph.toml";

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct GraphConfig {
        pub path: Option<String>,
        pub bidirectional: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct ExploreConfig {
        pub hops: Option<usize>,
        pub depth: Option<usize>,
        pub limit_nodes: Option<usize>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct DotConfig {
        pub legend: Option<bool>,
        pub theme: Option<String>,   // "light" | "dark"
        pub rankdir: Option<String>, // "LR" | "TB"
        pub splines: Option<String>, // "curved" | "ortho" | "polyline"
        pub rounded: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct QueryConfig {
        pub default_format: Option<String>, // "text" | "json"
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Config {
        pub graph: Option<GraphConfig>,
        pub explore: Option<ExploreConfig>,
        pub query: Option<QueryConfig>,
        pub dot: Option<DotConfig>,
    }

    fn default_config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Parse the TOML file at `path`. Unreadable or malformed files yield `None`
    /// and a warning in the log.
    #[must_use]
    pub fn load_config_at(path: &Path) -> Option<Config> {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config");
                return None;
            }
        };
        match toml::from_str::<Config>(&data) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config");
                None
            }
        }
    }

    /// Look for `concept-graph.toml` in `dir`.
    #[must_use]
    pub fn load_config_near(dir: &Path) -> Option<Config> {
        let p = default_config_path(dir);
        if p.exists() {
            load_config_at(&p)
        } else {
            None
        }
    }
}

pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Environment variable checked before `RUST_LOG`.
    pub const LOG_ENV: &str = "CONCEPT_GRAPH_LOG";

    /// Default filter directive for the CLI flags.
    #[must_use]
    pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
        if quiet {
            return "error";
        }
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber. Logs go to stderr so stdout stays
    /// parseable for `--format json`. Calling it twice is a no-op.
    pub fn init_tracing(verbose: u8, quiet: bool) {
        let filter = std::env::var(LOG_ENV)
            .ok()
            .and_then(|v| EnvFilter::try_new(v).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new(level_for(verbose, quiet)));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init();
    }
}
