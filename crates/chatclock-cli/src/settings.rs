use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chatclock_core::{
    resolve_gap_minutes, AnalysisOptions, CountingPolicy, DateOrder, DEFAULT_GAP_MINUTES,
};
use serde::Deserialize;

const CONFIG_ENV: &str = "CHATCLOCK_CONFIG";
const GAP_ENV: &str = "CHATCLOCK_GAP_MINUTES";
const DATE_ORDER_ENV: &str = "CHATCLOCK_DATE_ORDER";
const COUNT_BY_ENV: &str = "CHATCLOCK_COUNT_BY";

/// Contents of `settings.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gap_minutes: Option<i64>,
    #[serde(default)]
    pub date_order: Option<String>,
    #[serde(default)]
    pub count_by: Option<String>,
}

impl Settings {
    /// `$CHATCLOCK_CONFIG`, else `<config_dir>/chatclock/settings.toml`.
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("chatclock").join("settings.toml"))
    }

    /// Missing or malformed settings files yield defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "loaded settings");
                settings
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring malformed settings");
                Self::default()
            }
        }
    }

    /// Merge command-line values, environment and this file.
    ///
    /// Priority: command line > environment > settings file > default.
    pub fn resolve(
        &self,
        cli_gap: Option<&str>,
        cli_date_order: Option<DateOrder>,
        cli_count_by: Option<CountingPolicy>,
    ) -> AnalysisOptions {
        let gap_minutes = cli_gap
            .map(resolve_gap_minutes)
            .or_else(|| env_value(GAP_ENV).map(|v| resolve_gap_minutes(&v)))
            .or_else(|| self.gap_minutes.map(|g| resolve_gap_minutes(&g.to_string())))
            .unwrap_or(DEFAULT_GAP_MINUTES);

        let forced_date_order = cli_date_order
            .or_else(|| env_value(DATE_ORDER_ENV).and_then(|v| parse_or_warn(DATE_ORDER_ENV, &v)))
            .or_else(|| {
                self.date_order
                    .as_deref()
                    .and_then(|v| parse_or_warn("date_order", v))
            });

        let counting_policy = cli_count_by
            .or_else(|| env_value(COUNT_BY_ENV).and_then(|v| parse_or_warn(COUNT_BY_ENV, &v)))
            .or_else(|| {
                self.count_by
                    .as_deref()
                    .and_then(|v| parse_or_warn("count_by", v))
            })
            .unwrap_or_default();

        AnalysisOptions {
            gap_minutes,
            forced_date_order,
            counting_policy,
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or_warn<T>(source: &str, value: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(source, error = %err, "ignoring invalid setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for name in [CONFIG_ENV, GAP_ENV, DATE_ORDER_ENV, COUNT_BY_ENV] {
            std::env::remove_var(name);
        }
    }

    fn settings_from(content: &str) -> Settings {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, content).unwrap();
        Settings::load_from(&path)
    }

    #[test]
    #[serial]
    fn test_defaults_without_any_source() {
        clear_env();
        let options = Settings::default().resolve(None, None, None);
        assert_eq!(options, AnalysisOptions::default());
    }

    #[test]
    fn test_load_from_file() {
        let settings = settings_from(
            r#"
gap_minutes = 3
date_order = "dmy"
count_by = "presence"
"#,
        );
        assert_eq!(settings.gap_minutes, Some(3));
        assert_eq!(settings.date_order.as_deref(), Some("dmy"));
        assert_eq!(settings.count_by.as_deref(), Some("presence"));
    }

    #[test]
    fn test_load_missing_or_malformed_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml"));
        assert_eq!(settings.gap_minutes, None);

        let settings = settings_from("gap_minutes = \"five\"");
        assert_eq!(settings.gap_minutes, None);
    }

    #[test]
    #[serial]
    fn test_file_values_apply() {
        clear_env();
        let settings = settings_from("gap_minutes = 3\ndate_order = \"mdy\"\ncount_by = \"presence\"");
        let options = settings.resolve(None, None, None);
        assert_eq!(options.gap_minutes, 3);
        assert_eq!(options.forced_date_order, Some(DateOrder::Mdy));
        assert_eq!(options.counting_policy, CountingPolicy::Presence);
    }

    #[test]
    #[serial]
    fn test_invalid_file_values_fall_back() {
        clear_env();
        let settings = settings_from("gap_minutes = -4\ndate_order = \"ymd\"\ncount_by = \"end\"");
        let options = settings.resolve(None, None, None);
        assert_eq!(options, AnalysisOptions::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        std::env::set_var(GAP_ENV, "12");
        std::env::set_var(DATE_ORDER_ENV, "dmy");
        let settings = settings_from("gap_minutes = 3\ndate_order = \"mdy\"");
        let options = settings.resolve(None, None, None);
        clear_env();

        assert_eq!(options.gap_minutes, 12);
        assert_eq!(options.forced_date_order, Some(DateOrder::Dmy));
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var(GAP_ENV, "12");
        std::env::set_var(COUNT_BY_ENV, "presence");
        let options = Settings::default().resolve(
            Some("30"),
            Some(DateOrder::Mdy),
            Some(CountingPolicy::Start),
        );
        clear_env();

        assert_eq!(options.gap_minutes, 30);
        assert_eq!(options.forced_date_order, Some(DateOrder::Mdy));
        assert_eq!(options.counting_policy, CountingPolicy::Start);
    }

    #[test]
    #[serial]
    fn test_invalid_cli_gap_uses_default_not_lower_layers() {
        clear_env();
        std::env::set_var(GAP_ENV, "12");
        let options = Settings::default().resolve(Some("-1"), None, None);
        clear_env();

        assert_eq!(options.gap_minutes, DEFAULT_GAP_MINUTES);
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "gap_minutes = 9").unwrap();
        std::env::set_var(CONFIG_ENV, &path);

        let settings = Settings::load();
        clear_env();

        assert_eq!(settings.gap_minutes, Some(9));
    }
}
