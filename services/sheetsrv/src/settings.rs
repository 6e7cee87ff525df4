//! Runtime site settings
//!
//! Compiled-in defaults overlaid with the rows of `site_settings`. Resolved
//! per request and passed along explicitly.

use std::collections::BTreeMap;

use errors::{validation_error, SummitError, SummitResult};
use serde::Serialize;
use tracing::warn;

use crate::store::SettingsStore;

/// Default value of every known key
pub const DEFAULTS: &[(&str, &str)] = &[
    // Brand color scale
    ("color_brand_50", "#EFF7F4"),
    ("color_brand_100", "#CCCCC1"),
    ("color_brand_200", "#A6DCCD"),
    ("color_brand_300", "#9A9C91"),
    ("color_brand_400", "#9EA481"),
    ("color_brand_500", "#6EA451"),
    ("color_brand_600", "#4A6264"),
    ("color_brand_700", "#3D5254"),
    ("color_brand_800", "#434C4C"),
    ("color_brand_900", "#2F3636"),
    // Named tokens
    ("color_sage", "#6EA451"),
    ("color_seafoam", "#A6DCCD"),
    ("color_teal", "#4A6264"),
    ("color_charcoal", "#434C4C"),
    ("color_olive", "#9EA481"),
    ("color_linen", "#CCCCC1"),
    ("color_cool_gray", "#9A9C91"),
    ("color_vision_purple", "#8B7BA8"),
    // Site content
    ("site_title", "Global Online Regeneration Summit"),
    (
        "site_tagline",
        "A global gathering of regenerative thinkers, practitioners, and changemakers. Online. Open. Transformative.",
    ),
    ("site_coming_soon", "Coming Soon"),
    // Dropdown options, JSON arrays of strings
    (
        "speaker_statuses",
        r#"["Not Contacted","Outreach Sent","Follow Up Sent","In Conversation","Confirmed","Declined","No Response"]"#,
    ),
    (
        "session_types",
        r#"["Keynote","Panel","Workshop","Lightning Talk","Fireside Chat","Interview"]"#,
    ),
    (
        "partner_statuses",
        r#"["Prospecting","In Discussion","Agreement Sent","Confirmed","Active","Completed","Declined"]"#,
    ),
    (
        "partner_types",
        r#"["Sponsor","Media Partner","Community Partner","Co-Organizer","In-Kind","Affiliate"]"#,
    ),
];

/// Keys holding dropdown option lists
pub const OPTION_KEYS: [&str; 4] = [
    "speaker_statuses",
    "session_types",
    "partner_statuses",
    "partner_types",
];

/// Setting key → CSS custom property, in output order
const CSS_VARS: [(&str, &str); 18] = [
    ("color_brand_50", "--color-brand-50"),
    ("color_brand_100", "--color-brand-100"),
    ("color_brand_200", "--color-brand-200"),
    ("color_brand_300", "--color-brand-300"),
    ("color_brand_400", "--color-brand-400"),
    ("color_brand_500", "--color-brand-500"),
    ("color_brand_600", "--color-brand-600"),
    ("color_brand_700", "--color-brand-700"),
    ("color_brand_800", "--color-brand-800"),
    ("color_brand_900", "--color-brand-900"),
    ("color_sage", "--color-sage"),
    ("color_seafoam", "--color-seafoam"),
    ("color_teal", "--color-teal"),
    ("color_charcoal", "--color-charcoal"),
    ("color_olive", "--color-olive"),
    ("color_linen", "--color-linen"),
    ("color_cool_gray", "--color-cool-gray"),
    ("color_vision_purple", "--color-vision-purple"),
];

pub fn is_known_key(key: &str) -> bool {
    DEFAULTS.iter().any(|(k, _)| *k == key)
}

fn default_value(key: &str) -> Option<&'static str> {
    DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn parse_options(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw).ok()
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            values: DEFAULTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with stored rows; stored values win
    ///
    /// Unknown keys are kept so newer rows survive an older binary.
    pub fn merged<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut settings = Self::default();
        settings.values.extend(rows);
        settings
    }

    /// Resolve from the store, falling back to defaults if it cannot be read
    pub async fn load(store: &dyn SettingsStore) -> Self {
        match store.load_settings().await {
            Ok(rows) => Self::merged(rows),
            Err(e) => {
                warn!("Site settings unavailable, using defaults: {}", e);
                Self::default()
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// `--color-*` custom properties joined with `"; "`
    pub fn css_vars(&self) -> String {
        CSS_VARS
            .iter()
            .map(|(key, var)| format!("{}: {}", var, self.get(key).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Options of a dropdown list
    ///
    /// A stored value that is not a JSON array of strings falls back to the
    /// default list for that key.
    pub fn options(&self, key: &str) -> Vec<String> {
        if let Some(options) = self.get(key).and_then(parse_options) {
            return options;
        }
        if self.get(key).is_some() {
            warn!("Setting '{}' is not a JSON string array, using default", key);
        }
        default_value(key)
            .and_then(parse_options)
            .unwrap_or_default()
    }
}

/// Check a write before it reaches the store
pub fn validate_setting(key: &str, value: &str) -> SummitResult<()> {
    if !is_known_key(key) {
        return Err(SummitError::BadRequest(format!("Unknown setting '{}'", key)));
    }
    if OPTION_KEYS.contains(&key) && parse_options(value).is_none() {
        return Err(validation_error!("'{}' must be a JSON array of strings", key));
    }
    if value.trim().is_empty() {
        return Err(validation_error!("'{}' must not be empty", key));
    }
    Ok(())
}
