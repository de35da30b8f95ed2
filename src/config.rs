//! Server configuration loaded from environment variables.

use crate::deck::WordCatalogue;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub port: u16,
    /// New joins beyond this are refused; rejoins are not counted against it
    pub max_players_per_room: usize,
    /// How long a dropped player's slot is kept. Zero keeps it until the room dies.
    pub reconnect_grace: Duration,
    /// Optional JSON catalogue replacing the built-in word pairs
    pub word_pairs_file: Option<PathBuf>,
    pub static_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_players_per_room: 12,
            reconnect_grace: Duration::from_secs(120),
            word_pairs_file: None,
            static_dir: PathBuf::from("static"),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

impl GameConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = parse_env("PORT").unwrap_or(defaults.port);

        let max_players_per_room = parse_env::<usize>("MAX_PLAYERS_PER_ROOM")
            .filter(|&max| max >= crate::types::MIN_PLAYERS)
            .unwrap_or(defaults.max_players_per_room);

        let reconnect_grace = parse_env::<u64>("RECONNECT_GRACE_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.reconnect_grace);

        let word_pairs_file = std::env::var("WORD_PAIRS_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        tracing::info!(
            port,
            max_players_per_room,
            reconnect_grace_secs = reconnect_grace.as_secs(),
            word_pairs_file = ?word_pairs_file,
            "Game config loaded"
        );

        Self {
            port,
            max_players_per_room,
            reconnect_grace,
            word_pairs_file,
            static_dir,
        }
    }

    /// The configured catalogue, or the built-in one if none is set or it fails to load
    pub fn load_catalogue(&self) -> WordCatalogue {
        let Some(path) = &self.word_pairs_file else {
            return WordCatalogue::builtin();
        };

        match WordCatalogue::from_json_file(path) {
            Ok(catalogue) => {
                tracing::info!(pairs = catalogue.len(), "Loaded word pairs from {}", path.display());
                catalogue
            }
            Err(e) => {
                tracing::warn!("{}. Falling back to built-in word pairs.", e);
                WordCatalogue::builtin()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const VARS: &[&str] = &[
        "PORT",
        "MAX_PLAYERS_PER_ROOM",
        "RECONNECT_GRACE_SECS",
        "WORD_PAIRS_FILE",
        "STATIC_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = GameConfig::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_players_per_room, 12);
        assert_eq!(config.reconnect_grace, Duration::from_secs(120));
        assert!(config.word_pairs_file.is_none());
    }

    #[test]
    #[serial]
    fn test_reads_env_overrides() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("MAX_PLAYERS_PER_ROOM", "6");
        std::env::set_var("RECONNECT_GRACE_SECS", "0");

        let config = GameConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_players_per_room, 6);
        assert_eq!(config.reconnect_grace, Duration::ZERO);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        // Below the minimum needed to play
        std::env::set_var("MAX_PLAYERS_PER_ROOM", "2");

        let config = GameConfig::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_players_per_room, 12);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_catalogue_from_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["Lion", "Tiger"]]"#).unwrap();
        std::env::set_var("WORD_PAIRS_FILE", file.path());

        let config = GameConfig::from_env();
        assert_eq!(config.load_catalogue().len(), 1);
        clear_env();
    }

    #[test]
    fn test_missing_catalogue_file_falls_back() {
        let config = GameConfig {
            word_pairs_file: Some(PathBuf::from("/definitely/not/here.json")),
            ..GameConfig::default()
        };
        assert_eq!(
            config.load_catalogue().len(),
            WordCatalogue::builtin().len()
        );
    }
}
