/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sim::level::Limits;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub map_file: PathBuf,
    /// `None` disables logging.
    pub log_file: Option<PathBuf>,
    pub tick_rate: Duration,
    pub limits: Limits,
    pub sound_enabled: bool,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    limits: TomlLimits,
    #[serde(default)]
    sound: TomlSound,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_map_file")]
    map_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlLimits {
    #[serde(default = "default_max_width")]
    max_width: usize,
    #[serde(default = "default_max_height")]
    max_height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_sound_enabled")]
    enabled: bool,
}

// ── Defaults ──

fn default_map_file() -> String { "map.txt".into() }
fn default_log_file() -> String { "nuguri.log".into() }
fn default_tick_rate() -> u64 { 90 }
fn default_max_width() -> usize { Limits::default().max_width }
fn default_max_height() -> usize { Limits::default().max_height }
fn default_sound_enabled() -> bool { true }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { map_file: default_map_file(), log_file: default_log_file() }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlLimits {
    fn default() -> Self {
        TomlLimits { max_width: default_max_width(), max_height: default_max_height() }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: default_sound_enabled() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let log_file = match toml_cfg.general.log_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        GameConfig {
            map_file: resolve_data_file(&toml_cfg.general.map_file, search_dirs),
            log_file,
            tick_rate: Duration::from_millis(toml_cfg.speed.tick_rate_ms),
            limits: Limits {
                max_width: toml_cfg.limits.max_width.max(1),
                max_height: toml_cfg.limits.max_height.max(1),
            },
            sound_enabled: toml_cfg.sound.enabled,
        }
    }
}

/// Absolute paths are used as given; relative paths are looked up in the
/// candidate dirs, falling back to the CWD-relative path.
fn resolve_data_file(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before logging is set up, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text, &path),
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: {} parse error: {e}", path.display());
            eprintln!("Using default settings.");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_text(text: &str) -> GameConfig {
        GameConfig::resolve(parse_toml(text, Path::new("config.toml")), &[])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = from_text("");
        assert_eq!(cfg.map_file, PathBuf::from("map.txt"));
        assert_eq!(cfg.log_file, Some(PathBuf::from("nuguri.log")));
        assert_eq!(cfg.tick_rate, Duration::from_millis(90));
        assert_eq!(cfg.limits, Limits::default());
        assert!(cfg.sound_enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = from_text("[speed]\ntick_rate_ms = 40\n\n[limits]\nmax_width = 80\n");
        assert_eq!(cfg.tick_rate, Duration::from_millis(40));
        assert_eq!(cfg.limits.max_width, 80);
        assert_eq!(cfg.limits.max_height, Limits::default().max_height);
        assert_eq!(cfg.map_file, PathBuf::from("map.txt"));
    }

    #[test]
    fn empty_log_file_disables_logging() {
        let cfg = from_text("[general]\nlog_file = \"\"\n");
        assert_eq!(cfg.log_file, None);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let cfg = from_text("[speed\ntick_rate_ms = ");
        assert_eq!(cfg.tick_rate, Duration::from_millis(90));
    }

    #[test]
    fn zero_limits_are_raised_to_one() {
        let cfg = from_text("[limits]\nmax_width = 0\nmax_height = 0\n");
        assert_eq!(cfg.limits, Limits { max_width: 1, max_height: 1 });
    }

    #[test]
    fn map_file_found_in_search_dir() {
        let dir = std::env::temp_dir().join(format!("nuguri-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stages.txt"), "#S#\n").unwrap();

        let found = resolve_data_file("stages.txt", &[PathBuf::from("/nonexistent"), dir.clone()]);
        assert_eq!(found, dir.join("stages.txt"));
        let missing = resolve_data_file("other.txt", &[dir.clone()]);
        assert_eq!(missing, PathBuf::from("other.txt"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
