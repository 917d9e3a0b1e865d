use serde::Deserialize;
use std::fs;

/// Tracker configuration, read from `config.json` at startup. Only the
/// query is required; everything else mirrors the upstream defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub query: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Local wall-clock time (HH:MM) of the daily summary boundary.
    #[serde(default = "default_summary_time")]
    pub summary_time: String,
    /// Base directory for the ranks/ and analyses/ folders.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_sort() -> String {
    "popular".to_string()
}

fn default_check_interval() -> u64 {
    300
}

fn default_summary_time() -> String {
    "23:59".to_string()
}

fn default_data_dir() -> String {
    ".".to_string()
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"query": "духи женские"}"#).unwrap();
        assert_eq!(config.query, "духи женские");
        assert_eq!(config.sort, "popular");
        assert_eq!(config.check_interval_seconds, 300);
        assert_eq!(config.summary_time, "23:59");
        assert_eq!(config.data_dir, ".");
    }

    #[test]
    fn missing_query_is_an_error() {
        assert!(serde_json::from_str::<AppConfig>("{}").is_err());
    }
}
