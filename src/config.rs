// ⚙️ Configuration - Environment variables (with optional .env file)

use crate::error::ConfigError;
use crate::sequencer::DelayPolicy;
use crate::theme::Theme;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_PARENT_ORIGIN: &str = "https://executasolutions.com";
pub const DEFAULT_TICK_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub theme: Theme,
    pub export_dir: PathBuf,
    pub stage_delay: DelayPolicy,
    pub bind: SocketAddr,
    pub parent_origin: String,
    pub tick: Duration,
}

impl DashboardConfig {
    /// Load `.env` (if present) and read `FINANCEPRO_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let theme = match lookup("FINANCEPRO_THEME") {
            Some(v) => v.parse()?,
            None => Theme::default(),
        };

        let export_dir = lookup("FINANCEPRO_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let stage_delay = match lookup("FINANCEPRO_STAGE_DELAY") {
            Some(v) => parse_delay(&v)?,
            None => DelayPolicy::Fixed,
        };

        let bind_raw = lookup("FINANCEPRO_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(bind_raw.clone()))?;

        let parent_origin = lookup("FINANCEPRO_PARENT_ORIGIN")
            .map(|o| o.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PARENT_ORIGIN.to_string());

        let tick = match lookup("FINANCEPRO_TICK_MS") {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(ConfigError::InvalidTick(v)),
            },
            None => Duration::from_millis(DEFAULT_TICK_MS),
        };

        Ok(DashboardConfig {
            theme,
            export_dir,
            stage_delay,
            bind,
            parent_origin,
            tick,
        })
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            theme: Theme::default(),
            export_dir: PathBuf::from("."),
            stage_delay: DelayPolicy::Fixed,
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            parent_origin: DEFAULT_PARENT_ORIGIN.to_string(),
            tick: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}

/// `fixed`, `jitter` (1-2 s) or `jitter:<min_ms>-<max_ms>`
pub fn parse_delay(raw: &str) -> Result<DelayPolicy, ConfigError> {
    let value = raw.trim().to_lowercase();
    match value.as_str() {
        "fixed" => return Ok(DelayPolicy::Fixed),
        "jitter" => return Ok(DelayPolicy::default_jitter()),
        _ => {}
    }

    let invalid = || ConfigError::InvalidDelay(raw.to_string());
    let range = value.strip_prefix("jitter:").ok_or_else(invalid)?;
    let (min, max) = range.split_once('-').ok_or_else(invalid)?;
    let min: u64 = min.trim().parse().map_err(|_| invalid())?;
    let max: u64 = max.trim().parse().map_err(|_| invalid())?;

    if min > max {
        return Err(invalid());
    }

    Ok(DelayPolicy::Jittered {
        min: Duration::from_millis(min),
        max: Duration::from_millis(max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.bind.port(), 3000);

        println!("✅ Config defaults test passed");
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("FINANCEPRO_THEME", "corporate"),
            ("FINANCEPRO_EXPORT_DIR", "/tmp/reports"),
            ("FINANCEPRO_STAGE_DELAY", "jitter:1000-2000"),
            ("FINANCEPRO_BIND", "127.0.0.1:8080"),
            ("FINANCEPRO_PARENT_ORIGIN", "https://host.example/"),
            ("FINANCEPRO_TICK_MS", "50"),
        ]))
        .unwrap();

        assert_eq!(config.theme, Theme::Corporate);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(
            config.stage_delay,
            DelayPolicy::Jittered {
                min: Duration::from_millis(1000),
                max: Duration::from_millis(2000)
            }
        );
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.parent_origin, "https://host.example");
        assert_eq!(config.tick, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[("FINANCEPRO_THEME", "neon")])),
            Err(ConfigError::InvalidTheme(_))
        ));
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[("FINANCEPRO_BIND", "nowhere")])),
            Err(ConfigError::InvalidAddress(_))
        ));
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[("FINANCEPRO_TICK_MS", "0")])),
            Err(ConfigError::InvalidTick(_))
        ));
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay("FIXED"), Ok(DelayPolicy::Fixed));
        assert_eq!(parse_delay("jitter"), Ok(DelayPolicy::default_jitter()));
        assert!(parse_delay("jitter:2000-1000").is_err());
        assert!(parse_delay("jitter:abc").is_err());
        assert!(parse_delay("random").is_err());
    }
}
