use crate::config::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::Value;
use std::fs;

/// Keys every complete config file carries. Older files predate the
/// policy knobs and only hold `database`.
const EXPECTED_KEYS: [&str; 5] = [
    "database",
    "utc_offset_minutes",
    "alert_lookback_days",
    "alert_lookahead_days",
    "min_justification_chars",
];

/// Return the keys missing from the on-disk config file.
/// A missing file reports every key.
pub fn missing_fields() -> AppResult<Vec<&'static str>> {
    let path = Config::config_file();

    if !path.exists() {
        return Ok(EXPECTED_KEYS.to_vec());
    }

    let content = fs::read_to_string(&path)?;
    let yaml: Value = serde_yaml::from_str(&content).map_err(|_| AppError::ConfigLoad)?;

    let mut missing = Vec::new();
    if let Some(map) = yaml.as_mapping() {
        for key in EXPECTED_KEYS {
            if !map.contains_key(&Value::String(key.to_string())) {
                missing.push(key);
            }
        }
    } else {
        missing.extend(EXPECTED_KEYS);
    }

    Ok(missing)
}

/// Rewrite the config file with defaults filled in for any missing key.
/// Values already present are preserved by the serde defaults on load.
/// Returns true when the file changed.
pub fn run(cfg: &Config) -> AppResult<bool> {
    let missing = missing_fields()?;
    if missing.is_empty() {
        return Ok(false);
    }

    cfg.save()?;
    Ok(true)
}
