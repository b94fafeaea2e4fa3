//! Validation overrides: time-limited operator approvals.
//!
//! Operators approve a disruptive change by listing its validation id in an
//! override file that accompanies the deployment:
//!
//! ```toml
//! [[allow]]
//! id = "field-type-change"
//! until = "2026-11-01"
//! comment = "reindexing f1 as int"
//! ```
//!
//! `until` is an inclusive UTC date. It may be at most
//! [`MAX_OVERRIDE_DAYS`] days ahead of the time the file is loaded, so an
//! approval cannot silently cover unrelated changes months later. Unknown
//! ids are skipped with a warning so files written for newer releases still
//! load. An empty set of overrides denies every gated change.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::OverridesError;
use crate::domain::validation_id::ValidationId;
use crate::obs;

/// Longest time ahead an override may be valid for.
pub const MAX_OVERRIDE_DAYS: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One approval of a validation id, valid while `expires_at > now`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub validation_id: ValidationId,
    pub comment: String,
    pub expires_at: DateTime<Utc>,
}

impl OverrideEntry {
    pub fn new(
        validation_id: ValidationId,
        comment: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            validation_id,
            comment: comment.into(),
            expires_at,
        }
    }

    pub fn allows(&self, id: ValidationId, now: DateTime<Utc>) -> bool {
        self.validation_id == id && self.expires_at > now
    }
}

/// The set of approvals supplied with one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOverrides {
    entries: Vec<OverrideEntry>,
}

impl ValidationOverrides {
    /// No approvals; every gated change is blocked.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(entries: Vec<OverrideEntry>) -> Self {
        Self { entries }
    }

    pub fn with_entry(mut self, entry: OverrideEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    /// Whether some live entry approves `id` at `now`.
    pub fn allows(&self, id: ValidationId, now: DateTime<Utc>) -> bool {
        self.entries.iter().any(|e| e.allows(id, now))
    }

    /// Parse a TOML override file, checking expiry bounds against `now`.
    pub fn from_toml_str(input: &str, now: DateTime<Utc>) -> Result<Self, OverridesError> {
        let file: OverridesFile = toml::from_str(input)?;
        file.into_overrides(now)
    }

    /// Parse a JSON override file with the same shape as the TOML one.
    pub fn from_json_str(input: &str, now: DateTime<Utc>) -> Result<Self, OverridesError> {
        let file: OverridesFile = serde_json::from_str(input)?;
        file.into_overrides(now)
    }

    /// Load an override file, choosing the format from the extension.
    pub fn load(path: &Path, now: DateTime<Utc>) -> Result<Self, OverridesError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content, now),
            Some("json") => Self::from_json_str(&content, now),
            other => Err(OverridesError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// On-disk shape of an override file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridesFile {
    #[serde(default)]
    pub allow: Vec<AllowEntry>,
}

/// One `[[allow]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowEntry {
    pub id: String,
    /// Inclusive expiry date, `YYYY-MM-DD`.
    pub until: String,
    #[serde(default)]
    pub comment: String,
}

impl OverridesFile {
    /// A file approving `ids` through `until`.
    pub fn for_ids(
        ids: impl IntoIterator<Item = ValidationId>,
        until: NaiveDate,
        comment: &str,
    ) -> Self {
        Self {
            allow: ids
                .into_iter()
                .map(|id| AllowEntry {
                    id: id.to_string(),
                    until: until.format(DATE_FORMAT).to_string(),
                    comment: comment.to_string(),
                })
                .collect(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve entries against `now`; unknown ids are skipped.
    pub fn into_overrides(self, now: DateTime<Utc>) -> Result<ValidationOverrides, OverridesError> {
        let latest = now.date_naive() + Duration::days(MAX_OVERRIDE_DAYS);
        let mut entries = Vec::with_capacity(self.allow.len());

        for allow in self.allow {
            let id = match allow.id.parse::<ValidationId>() {
                Ok(id) => id,
                Err(err) => {
                    obs::emit_override_ignored(&allow.id, &err);
                    continue;
                }
            };
            let until = NaiveDate::parse_from_str(&allow.until, DATE_FORMAT).map_err(|_| {
                OverridesError::InvalidDate {
                    value: allow.until.clone(),
                }
            })?;
            if until > latest {
                return Err(OverridesError::UntilTooFarAhead {
                    id: allow.id,
                    until,
                    max_days: MAX_OVERRIDE_DAYS,
                });
            }
            let expires_at = end_of_day(until).ok_or_else(|| OverridesError::InvalidDate {
                value: allow.until.clone(),
            })?;
            entries.push(OverrideEntry::new(id, allow.comment, expires_at));
        }

        Ok(ValidationOverrides::new(entries))
    }
}

/// Start of the day after `date`, in UTC.
fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("parse RFC3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_empty_denies_everything() {
        let overrides = ValidationOverrides::empty();
        for id in ValidationId::ALL {
            assert!(!overrides.allows(id, at("2026-10-19T12:00:00Z")));
        }
    }

    #[test]
    fn test_entry_expiry_is_exclusive() {
        let entry = OverrideEntry::new(
            ValidationId::FieldTypeChange,
            "",
            at("2026-10-20T00:00:00Z"),
        );
        assert!(entry.allows(ValidationId::FieldTypeChange, at("2026-10-19T23:59:59Z")));
        assert!(!entry.allows(ValidationId::FieldTypeChange, at("2026-10-20T00:00:00Z")));
        assert!(!entry.allows(ValidationId::IndexingChange, at("2026-10-19T00:00:00Z")));
    }

    #[test]
    fn test_until_date_is_inclusive() {
        let now = at("2026-10-19T08:00:00Z");
        let overrides = ValidationOverrides::from_toml_str(
            r#"
            [[allow]]
            id = "field-type-change"
            until = "2026-10-25"
            comment = "reindex f1"
            "#,
            now,
        )
        .expect("parse overrides");

        assert_eq!(overrides.entries().len(), 1);
        assert_eq!(overrides.entries()[0].comment, "reindex f1");
        assert!(overrides.allows(ValidationId::FieldTypeChange, at("2026-10-25T23:00:00Z")));
        assert!(!overrides.allows(ValidationId::FieldTypeChange, at("2026-10-26T00:00:00Z")));
    }

    #[test]
    fn test_until_too_far_ahead_rejected() {
        let now = at("2026-10-19T08:00:00Z");
        let err = ValidationOverrides::from_toml_str(
            r#"
            [[allow]]
            id = "field-type-change"
            until = "2026-12-31"
            "#,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, OverridesError::UntilTooFarAhead { .. }));
    }

    #[test]
    fn test_unknown_ids_skipped() {
        let now = at("2026-10-19T08:00:00Z");
        let overrides = ValidationOverrides::from_json_str(
            r#"{"allow": [
                {"id": "not-a-real-id", "until": "2026-10-20"},
                {"id": "field-type-change", "until": "2026-10-20"}
            ]}"#,
            now,
        )
        .expect("parse overrides");
        assert_eq!(overrides.entries().len(), 1);
        assert_eq!(
            overrides.entries()[0].validation_id,
            ValidationId::FieldTypeChange
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = ValidationOverrides::from_toml_str(
            "[[allow]]\nid = \"field-type-change\"\nuntil = \"next week\"\n",
            at("2026-10-19T08:00:00Z"),
        )
        .unwrap_err();
        assert!(matches!(err, OverridesError::InvalidDate { .. }));
    }

    #[test]
    fn test_for_ids_renders_loadable_toml() {
        let now = at("2026-10-19T08:00:00Z");
        let until = NaiveDate::from_ymd_opt(2026, 10, 26).expect("date");
        let file = OverridesFile::for_ids([ValidationId::FieldTypeChange], until, "approved");
        let rendered = file.to_toml_string().expect("render");
        assert!(rendered.contains("field-type-change"));

        let overrides = ValidationOverrides::from_toml_str(&rendered, now).expect("reload");
        assert!(overrides.allows(ValidationId::FieldTypeChange, now));
    }
}
