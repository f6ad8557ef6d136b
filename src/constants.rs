// src/constants.rs

/// The only structural separator accepted inside a session path.
pub const PATH_SEPARATOR: char = '\\';

/// Character rejected by `cd`; forward slashes are never path delimiters here.
pub const FORBIDDEN_PATH_CHAR: char = '/';

/// Token that moves the current path one level up.
pub const PARENT_DIR_TOKEN: &str = "..";

/// The root every path is clamped to when navigation runs out of segments.
pub const ROOT_PATH: &str = "C:\\";

/// Path a new session starts in unless configured otherwise.
pub const DEFAULT_START_PATH: &str = "C:\\Users\\owner";

/// Folders created under the default start path of the in-memory storage.
pub const DEFAULT_HOME_FOLDERS: &[&str] = &["Desktop", "Documents", "Music", "Videos"];

/// Maximum number of scrollback lines kept by default.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Lines a display shows per frame by default (a 600px surface at 20px per line).
pub const DEFAULT_VISIBLE_LINES: usize = 30;

/// Host loop cadence in frames per second.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Name of the directory holding vshell configuration (in the system config dir).
pub const CONFIG_DIR_NAME: &str = "vshell";

/// Name of the main configuration file.
pub const CONFIG_FILENAME: &str = "config.toml";
