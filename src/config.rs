//! Configuración desde variables de entorno (con `.env` opcional).

use std::env;
use std::path::PathBuf;

use crate::broadcast::DEFAULT_CAPACITY;

pub const ENV_DATA_DIR: &str = "QUICKSLOT_DATA_DIR";
pub const ENV_CATALOG: &str = "QUICKSLOT_CATALOG";
pub const ENV_DEFAULT_TERM: &str = "QUICKSLOT_DEFAULT_TERM";
pub const ENV_EVENT_CAPACITY: &str = "QUICKSLOT_EVENT_CAPACITY";
pub const ENV_LOG: &str = "QUICKSLOT_LOG";

pub const DEFAULT_TERM: &str = "fall-2026";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub default_term: String,
    pub event_capacity: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_path: PathBuf::from("data/curriculum.json"),
            default_term: DEFAULT_TERM.to_string(),
            event_capacity: DEFAULT_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Carga `.env` si existe y luego lee las variables del proceso.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Igual que `from_env` pero con un lookup inyectable (para pruebas).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let event_capacity = non_empty(ENV_EVENT_CAPACITY)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.event_capacity);

        Self {
            data_dir: non_empty(ENV_DATA_DIR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            catalog_path: non_empty(ENV_CATALOG)
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            default_term: non_empty(ENV_DEFAULT_TERM).unwrap_or(defaults.default_term),
            event_capacity,
            log_level: non_empty(ENV_LOG).unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_defaults() {
        let cfg = Config::from_lookup(|_| None);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/tmp/qs"),
            (ENV_DEFAULT_TERM, "spring-2027"),
            (ENV_EVENT_CAPACITY, "0"),
            (ENV_LOG, "  "),
        ]
        .into_iter()
        .collect();
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/qs"));
        assert_eq!(cfg.default_term, "spring-2027");
        // capacidad 0 o vacío => por defecto
        assert_eq!(cfg.event_capacity, DEFAULT_CAPACITY);
        assert_eq!(cfg.log_level, "info");
    }
}
