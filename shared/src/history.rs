use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::HISTORY_CAPACITY;

/// One past delivered generation. Field names match the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub image_url: String,
    pub style: String,
    #[serde(rename = "timestamp")]
    pub timestamp_iso: String,
    pub email: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(
        image_url: impl Into<String>,
        style: impl Into<String>,
        email: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            style: style.into(),
            timestamp_iso: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            email: email.into(),
        }
    }

    /// `YYYY-MM-DD`, or the raw timestamp when it does not parse.
    #[must_use]
    pub fn date_label(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp_iso)
            .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.timestamp_iso.clone())
    }
}

/// Newest-first, bounded list of delivered results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Never fails: absent or unreadable data is an empty history.
    #[must_use]
    pub fn load(bytes: Option<&[u8]>) -> Self {
        let Some(bytes) = bytes else {
            return Self::new();
        };

        let records = match serde_json::from_slice::<Option<Vec<serde_json::Value>>>(bytes) {
            Ok(Some(records)) => records,
            Ok(None) => return Self::new(),
            Err(e) => {
                warn!(error = %e, bytes = bytes.len(), "discarding unreadable history");
                return Self::new();
            }
        };

        let total = records.len();
        let mut entries: Vec<HistoryEntry> = records
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect();

        if entries.len() < total {
            warn!(
                skipped = total - entries.len(),
                kept = entries.len(),
                "skipped malformed history records"
            );
        }

        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Prepends and evicts the oldest beyond capacity.
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn entry(n: usize) -> HistoryEntry {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        HistoryEntry::new(format!("https://cdn/{n}.png"), "poster", "me@site.io", at)
    }

    #[test]
    fn test_timestamp_matches_iso_string_shape() {
        assert_eq!(entry(0).timestamp_iso, "2026-10-16T09:30:00.000Z");
        assert_eq!(entry(0).date_label(), "2026-10-16");
    }

    #[test]
    fn test_persisted_field_names() {
        let json = serde_json::to_value(entry(1)).unwrap();
        assert_eq!(json["imageUrl"], "https://cdn/1.png");
        assert_eq!(json["style"], "poster");
        assert_eq!(json["timestamp"], "2026-10-16T09:30:00.000Z");
        assert_eq!(json["email"], "me@site.io");
    }

    #[test]
    fn test_load_absent_and_corrupt() {
        assert!(History::load(None).is_empty());
        assert!(History::load(Some(&b"null"[..])).is_empty());
        assert!(History::load(Some(&b"{not json"[..])).is_empty());
        assert!(History::load(Some(&b"{\"imageUrl\":\"x\"}"[..])).is_empty());
        assert!(History::load(Some(&[0xff_u8, 0xfe, 0x00][..])).is_empty());
    }

    #[test]
    fn test_load_skips_malformed_records() {
        let raw = br#"[
            {"imageUrl":"https://a.png","style":"mug","timestamp":"2026-01-01T00:00:00.000Z","email":"a@b.co"},
            {"imageUrl":42},
            "junk"
        ]"#;
        let history = History::load(Some(&raw[..]));
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].style, "mug");
    }

    #[test]
    fn test_load_truncates_oversized_lists() {
        let many: Vec<_> = (0..HISTORY_CAPACITY + 5).map(entry).collect();
        let bytes = serde_json::to_vec(&many).unwrap();
        let history = History::load(Some(bytes.as_slice()));
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.entries()[0], entry(0));
    }

    #[test]
    fn test_add_prepends() {
        let mut history = History::new();
        history.add(entry(1));
        history.add(entry(2));
        assert_eq!(history.get(0), Some(&entry(2)));
        assert_eq!(history.get(1), Some(&entry(1)));
    }

    #[test]
    fn test_twenty_first_evicts_oldest() {
        let mut history = History::new();
        for n in 0..HISTORY_CAPACITY {
            history.add(entry(n));
        }
        history.add(entry(100));

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.get(0), Some(&entry(100)));
        assert!(!history.entries().contains(&entry(0)));
        assert_eq!(history.get(HISTORY_CAPACITY - 1), Some(&entry(1)));
    }

    #[test]
    fn test_bytes_reload_to_same_history() {
        let mut history = History::new();
        history.add(entry(3));
        history.add(entry(4));
        let bytes = history.to_bytes().unwrap();
        assert_eq!(History::load(Some(bytes.as_slice())), history);
    }

    #[test]
    fn test_date_label_falls_back_to_raw() {
        let mut e = entry(0);
        e.timestamp_iso = "yesterday".into();
        assert_eq!(e.date_label(), "yesterday");
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(adds in 0usize..60) {
            let mut history = History::new();
            for n in 0..adds {
                history.add(entry(n));
            }
            prop_assert_eq!(history.len(), adds.min(HISTORY_CAPACITY));
            if adds > 0 {
                prop_assert_eq!(history.get(0), Some(&entry(adds - 1)));
            }
        }
    }
}
