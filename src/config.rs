//! Ambient run configuration: defaults plus whatever the CLI overrides.

use std::path::PathBuf;

use crate::consts::{
    DEFAULT_ARCHFILE, DEFAULT_BINARY, DEFAULT_GIVEALL_RANGE, DEFAULT_MACRO_DIR,
    DEFAULT_SNAPSHOT_DIR,
};

/// Which character-substitution table the mirror-room code reflection uses.
///
/// `Extended` additionally swaps `2` and `5`, matching the reflection seen in
/// the mirror room; `Minimal` only mirrors the letter-shaped digits. Kept
/// switchable since the substitution is a visual artifact of the room's font,
/// not a documented game rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionVariant {
    Minimal,
    Extended,
}

impl Default for ReflectionVariant {
    fn default() -> Self {
        ReflectionVariant::Extended
    }
}

/// Resolved configuration for a run: CLI flags layered over built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub binary_path: PathBuf,
    pub archfile_path: PathBuf,
    pub commands: Vec<String>,
    pub verbose: bool,
    pub snapshot_dir: PathBuf,
    pub macro_dir: PathBuf,
    pub giveall_range: (u16, u16, u16),
    pub reflection: ReflectionVariant,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from(DEFAULT_BINARY),
            archfile_path: PathBuf::from(DEFAULT_ARCHFILE),
            commands: Vec::new(),
            verbose: false,
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            macro_dir: PathBuf::from(DEFAULT_MACRO_DIR),
            giveall_range: DEFAULT_GIVEALL_RANGE,
            reflection: ReflectionVariant::default(),
        }
    }
}

impl Config {
    /// Parses CLI arguments (excluding argv[0]) into a `Config`, layered over
    /// defaults. Unrecognized flags are rejected; this mirrors the manual
    /// flag-loop style used for small tool CLIs rather than a declarative
    /// argument-parsing crate.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut config = Config::default();
        let mut args = args.into_iter().peekable();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-f" | "--file" => {
                    config.binary_path = PathBuf::from(
                        args.next().ok_or_else(|| format!("{arg} requires a path argument"))?,
                    );
                }
                "-a" | "--archfile" => {
                    config.archfile_path = PathBuf::from(
                        args.next().ok_or_else(|| format!("{arg} requires a path argument"))?,
                    );
                }
                "-c" | "--commands" => {
                    let raw = args.next().ok_or_else(|| format!("{arg} requires an argument"))?;
                    config.commands = raw.split(';').map(|s| s.trim().to_string()).collect();
                }
                "-v" | "--verbose" => {
                    config.verbose = true;
                }
                other => return Err(format!("unrecognized argument: {other}")),
            }
        }

        Ok(config)
    }
}
