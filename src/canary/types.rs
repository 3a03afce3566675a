//! Canary configuration and decision types.
//!
//! Field names follow the on-disk layout of the canary store (PascalCase),
//! with aliases so hand-written files using lower/camel case still load.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canary::error::CanaryError;

/// A cookie payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValue {
    #[serde(default, alias = "key")]
    pub key: String,
    #[serde(default, alias = "value")]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Split settings for one application (the `CookieInfo` block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanaryConfig {
    /// Cookie lifetime, `"<hours>h"`.
    #[serde(alias = "expiration")]
    pub expiration: String,

    /// Share of traffic, in [0, 1], that receives the success variant.
    #[serde(alias = "canaryPercent", alias = "percent", alias = "Percent")]
    pub canary_percent: f64,

    #[serde(alias = "ifSuccessful")]
    pub if_successful: KeyValue,

    /// Missing in some older files; an absent block decides to an empty pair.
    #[serde(default, alias = "ifFail")]
    pub if_fail: KeyValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewFlags {
    #[serde(default, alias = "showSuccess")]
    pub show_success: bool,
    #[serde(default, alias = "showFail")]
    pub show_fail: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingFlags {
    #[serde(default, alias = "disable")]
    pub disable: bool,
}

/// One application's record in the canary store.
///
/// Everything besides `cookie_info` is carried through untouched by the
/// decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppRecord {
    #[serde(alias = "name", alias = "appName", alias = "AppName")]
    pub name: String,

    #[serde(default, alias = "disable")]
    pub disable: bool,

    #[serde(default, alias = "mode", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(alias = "cookieInfo", alias = "cookie")]
    pub cookie_info: CanaryConfig,

    #[serde(default, alias = "view")]
    pub view: ViewFlags,

    #[serde(default, alias = "logging")]
    pub logging: LoggingFlags,
}

/// The full contents of the canary store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", from = "ConfigFile")]
pub struct ConfigSet {
    pub apps: Vec<AppRecord>,
    pub port: u16,
}

/// Raw file layout. Accepts both the canonical `Apps` list and the older flat
/// `cookies` list, which is folded into `Apps` after the canonical entries.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default, alias = "Apps")]
    apps: Vec<AppRecord>,
    #[serde(default, alias = "Cookies")]
    cookies: Vec<LegacyCookie>,
    #[serde(default, alias = "Port")]
    port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCookie {
    app_name: String,
    expiration: String,
    #[serde(alias = "canaryPercent")]
    percent: f64,
    #[serde(default)]
    if_successful: KeyValue,
    #[serde(default)]
    if_fail: KeyValue,
    #[serde(default)]
    mode: Option<String>,
}

impl From<LegacyCookie> for AppRecord {
    fn from(cookie: LegacyCookie) -> Self {
        AppRecord {
            name: cookie.app_name,
            disable: false,
            mode: cookie.mode,
            cookie_info: CanaryConfig {
                expiration: cookie.expiration,
                canary_percent: cookie.percent,
                if_successful: cookie.if_successful,
                if_fail: cookie.if_fail,
            },
            view: ViewFlags::default(),
            logging: LoggingFlags::default(),
        }
    }
}

impl From<ConfigFile> for ConfigSet {
    fn from(file: ConfigFile) -> Self {
        let mut apps = file.apps;
        apps.extend(file.cookies.into_iter().map(AppRecord::from));
        ConfigSet {
            apps,
            port: file.port,
        }
    }
}

/// Which variant a caller should serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Fail,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fail => "fail",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = CanaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Outcome::Success),
            "fail" => Ok(Outcome::Fail),
            other => Err(CanaryError::InvalidArgument(format!(
                "outcome must be 'success' or 'fail', got '{}'",
                other
            ))),
        }
    }
}

/// The decision handed back to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    pub key: String,
    pub value: String,
    /// RFC 3339, second precision.
    pub expiration: String,
    pub canary_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip, default = "default_outcome")]
    pub outcome: Outcome,
}

fn default_outcome() -> Outcome {
    Outcome::Fail
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = r#"
Apps:
- Name: jupyterhub
  Disable: false
  CookieInfo:
    Expiration: 48h
    CanaryPercent: 0.9
    IfSuccessful:
      Key: a
      Value: a
    IfFail:
      Key: b
      Value: b
  View:
    ShowSuccess: true
    ShowFail: true
  Logging:
    Disable: false
Port: 8080
"#;

    #[test]
    fn test_canonical_layout() {
        let set: ConfigSet = serde_yaml::from_str(CANONICAL).unwrap();
        assert_eq!(set.port, 8080);
        assert_eq!(set.apps.len(), 1);

        let app = &set.apps[0];
        assert_eq!(app.name, "jupyterhub");
        assert_eq!(app.cookie_info.expiration, "48h");
        assert_eq!(app.cookie_info.canary_percent, 0.9);
        assert_eq!(app.cookie_info.if_fail, KeyValue::new("b", "b"));
        assert!(app.view.show_success && app.view.show_fail);
        assert!(!app.logging.disable);
        assert_eq!(app.mode, None);
    }

    #[test]
    fn test_legacy_layout() {
        let raw = r#"
cookies:
  - appName: hub
    expiration: 12h
    percent: 0.25
    cookieName: canary
    ifSuccessful:
      key: c
      value: new
port: 9000
"#;
        let set: ConfigSet = serde_yaml::from_str(raw).unwrap();
        assert_eq!(set.port, 9000);
        let app = &set.apps[0];
        assert_eq!(app.name, "hub");
        assert_eq!(app.cookie_info.canary_percent, 0.25);
        assert_eq!(app.cookie_info.if_successful, KeyValue::new("c", "new"));
        assert_eq!(app.cookie_info.if_fail, KeyValue::default());
    }

    #[test]
    fn test_serializes_canonical_keys() {
        let set: ConfigSet = serde_yaml::from_str(CANONICAL).unwrap();
        let yaml = serde_yaml::to_string(&set).unwrap();
        assert!(yaml.contains("Apps:"));
        assert!(yaml.contains("CanaryPercent: 0.9"));
        assert!(!yaml.contains("Mode"));

        let back: ConfigSet = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!("success".parse::<Outcome>().unwrap(), Outcome::Success);
        assert_eq!("fail".parse::<Outcome>().unwrap(), Outcome::Fail);
        assert!(matches!(
            "maybe".parse::<Outcome>(),
            Err(CanaryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decision_field_names() {
        let decision = DecisionResult {
            key: "a".into(),
            value: "b".into(),
            expiration: "2021-01-03T01:01:01Z".into(),
            canary_percent: 0.5,
            mode: Some("ab".into()),
            disabled: None,
            outcome: Outcome::Success,
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["canaryPercent"], 0.5);
        assert_eq!(json["mode"], "ab");
        assert!(json.get("disabled").is_none());
        assert!(json.get("outcome").is_none());
    }
}
