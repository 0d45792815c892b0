use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod migrate; // use submodule at src/config/migrate.rs

/// Application configuration.
///
/// Besides the database path this carries the policy knobs the ledger
/// needs injected instead of reading ambient state: the fixed UTC offset
/// used for day-boundary math, the forgotten-alert submission window and
/// the minimum justification length for exception requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_alert_lookback_days")]
    pub alert_lookback_days: i64,
    #[serde(default = "default_alert_lookahead_days")]
    pub alert_lookahead_days: i64,
    #[serde(default = "default_min_justification_chars")]
    pub min_justification_chars: usize,
}

// Ledger convention: all day boundaries live in one fixed zone (UTC-3).
fn default_utc_offset_minutes() -> i32 {
    -180
}
fn default_alert_lookback_days() -> i64 {
    7
}
fn default_alert_lookahead_days() -> i64 {
    1
}
fn default_min_justification_chars() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            utc_offset_minutes: default_utc_offset_minutes(),
            alert_lookback_days: default_alert_lookback_days(),
            alert_lookahead_days: default_alert_lookahead_days(),
            min_justification_chars: default_min_justification_chars(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(".punchlog")
        } else {
            PathBuf::from(".punchlog")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("punchlog.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("punchlog.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            serde_yaml::from_str(&content).map_err(|_| AppError::ConfigLoad)
        } else {
            Ok(Config::default())
        }
    }

    /// Write the configuration back to its file.
    pub fn save(&self) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        fs::create_dir_all(Self::config_dir())?;
        let mut file = fs::File::create(Self::config_file()).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes()).map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> io::Result<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB path: user provided or default
        let db_path = if let Some(name) = custom_db {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| io::Error::other(format!("config serialization: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("Database:    {:?}", db_path);

        Ok(())
    }

    /// The fixed local zone every day-boundary computation uses.
    pub fn tz(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset"))
    }

    /// Normalize an absolute instant to local wall time.
    pub fn localize(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.tz()).naive_local()
    }

    /// Interpret a local wall time as an absolute instant.
    pub fn to_instant(&self, local: NaiveDateTime) -> AppResult<DateTime<Utc>> {
        local
            .and_local_timezone(self.tz())
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::InvalidTime(local.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn localize_applies_fixed_offset() {
        let cfg = Config {
            database: ":memory:".into(),
            ..Config::default()
        };
        // 2024-06-01 02:30 UTC is 2024-05-31 23:30 at UTC-3
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 2, 30, 0).unwrap();
        let local = cfg.localize(now);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(local.time().to_string(), "23:30:00");
    }

    #[test]
    fn instant_roundtrip() {
        let cfg = Config {
            database: ":memory:".into(),
            ..Config::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let back = cfg.to_instant(cfg.localize(now)).unwrap();
        assert_eq!(now, back);
    }
}
