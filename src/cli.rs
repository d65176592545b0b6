use crate::config::AppConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;

const DEFAULT_CONFIG_PATH: &str = "config/metaworkspace.json";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    config_path: Option<String>,
    user: Option<String>,
    min_distance: Option<f32>,
    max_distance: Option<f32>,
    screen_space_panning: Option<bool>,
    catalog_path: Option<String>,
    avatar_store_path: Option<String>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config_path = Some(value),
                "user" => overrides.user = Some(value),
                "min-distance" => overrides.min_distance = Some(parse_distance("min-distance", &value)?),
                "max-distance" => overrides.max_distance = Some(parse_distance("max-distance", &value)?),
                "screen-panning" => overrides.screen_space_panning = Some(parse_bool_flag("screen-panning", &value)?),
                "catalog" => overrides.catalog_path = Some(value),
                "avatar-store" => overrides.avatar_store_path = Some(value),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --user, --min-distance, --max-distance, \
                     --screen-panning, --catalog, --avatar-store."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> &str {
        self.config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn into_config_overrides(self) -> AppConfigOverrides {
        AppConfigOverrides {
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            screen_space_panning: self.screen_space_panning,
            catalog_path: self.catalog_path,
            avatar_store_path: self.avatar_store_path,
        }
    }
}

fn parse_distance(flag: &str, value: &str) -> Result<f32> {
    let distance = value.parse::<f32>().with_context(|| format!("Invalid {flag} '{value}'"))?;
    if !distance.is_finite() || distance <= 0.0 {
        bail!("Invalid {flag} '{value}'. Expected a positive distance.");
    }
    Ok(distance)
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camera_and_path_flags() {
        let args = ["app", "--min-distance", "4", "--max-distance", "40", "--catalog", "office.json"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.config_path(), DEFAULT_CONFIG_PATH);
        let cfg = overrides.into_config_overrides();
        assert_eq!((cfg.min_distance, cfg.max_distance), (Some(4.0), Some(40.0)));
        assert_eq!(cfg.catalog_path.as_deref(), Some("office.json"));
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["app", "--user", "alice", "--user", "bob", "--screen-panning", "on", "--screen-panning", "off"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.user(), Some("bob"));
        assert_eq!(overrides.into_config_overrides().screen_space_panning, Some(false));
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["app", "--catalog"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_non_positive_distance() {
        let err = CliOverrides::parse(["app", "--min-distance", "-2"]).unwrap_err();
        assert!(err.to_string().contains("positive"), "negative distances should error");
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = CliOverrides::parse(["app", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
    }
}
