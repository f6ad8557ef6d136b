// src/cli.rs

use crate::{core::config_loader::ConfigOverrides, models::StorageKind};
use clap::Parser;

/// vshell: a minimal interactive shell session.
///
/// Lines typed on stdin (or read from a script) are queued and run one at a time by a
/// background worker. Built-in commands:
///
/// - `echo <text>`   print the text
/// - `ls [path]`     list the current or given directory
/// - `cd <path>`     change the current path (`..` goes up one level)
/// - `man ls`        show the manual
/// - `exit`          end the session
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to load instead of the default one. `~` and `$VAR` are expanded.
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Path the session starts in.
    #[arg(long, value_name = "PATH")]
    pub start_path: Option<String>,

    /// Scrollback lines kept before the oldest are dropped.
    #[arg(long, value_name = "LINES")]
    pub max_history: Option<usize>,

    /// Storage backing `ls` and `cd`.
    #[arg(long, value_enum)]
    pub storage: Option<StorageKind>,

    /// Run the lines of this file instead of reading stdin.
    #[arg(long, value_name = "FILE")]
    pub script: Option<String>,

    /// Print output without colors.
    #[arg(long)]
    pub no_color: bool,

    /// Skip the welcome banner.
    #[arg(long)]
    pub no_welcome: bool,
}

impl Cli {
    /// The settings given on the command line that take precedence over the config file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_path: self.start_path.clone(),
            max_history: self.max_history,
            storage: self.storage,
            welcome: self.no_welcome.then_some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_override_nothing() {
        let cli = Cli::try_parse_from(["vshell"]).unwrap();
        assert_eq!(cli.overrides(), ConfigOverrides::default());
        assert!(!cli.no_color);
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "vshell",
            "--start-path",
            "C:\\",
            "--max-history",
            "12",
            "--storage",
            "os",
            "--no-welcome",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.start_path.as_deref(), Some("C:\\"));
        assert_eq!(overrides.max_history, Some(12));
        assert_eq!(overrides.storage, Some(StorageKind::Os));
        assert_eq!(overrides.welcome, Some(false));
    }

    #[test]
    fn test_unknown_storage_is_rejected() {
        assert!(Cli::try_parse_from(["vshell", "--storage", "cloud"]).is_err());
    }
}
