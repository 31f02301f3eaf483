/// Data structures for per-video trims
use crate::config::TITLE_SUFFIX;
use crate::error::TrimError;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Saved trim for one video, as stored under the video ID
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrimSetting {
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub start: u32,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub end: u32,
    #[serde(default, deserialize_with = "lenient_title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TrimSetting {
    /// Build a setting from user input, rejecting `end <= start` when end is set
    pub fn new(start: u32, end: u32, title: Option<String>) -> Result<TrimSetting, TrimError> {
        TrimWindow::new(start, end)?;
        Ok(TrimSetting { start, end, title })
    }

    pub fn window(&self) -> TrimWindow {
        TrimWindow {
            start: self.start,
            end: self.end,
        }
    }

    /// Label used in the saved list
    pub fn label<'a>(&'a self, video_id: &'a str) -> &'a str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(video_id)
    }
}

/// Allowed playback range in whole seconds; 0 disables that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimWindow {
    pub start: u32,
    pub end: u32,
}

impl TrimWindow {
    pub const NONE: TrimWindow = TrimWindow { start: 0, end: 0 };

    pub fn new(start: u32, end: u32) -> Result<TrimWindow, TrimError> {
        if end > 0 && start >= end {
            return Err(TrimError::InvalidWindow { start, end });
        }
        Ok(TrimWindow { start, end })
    }

    pub fn is_active(&self) -> bool {
        self.start > 0 || self.end > 0
    }
}

/// The focused tab, as returned by chrome.tabs.query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActiveTab {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// Parse a numeric input field the way `parseInt(value, 10) || 0` would
///
/// Leading whitespace and an optional sign are allowed, then the leading run
/// of digits is taken. Negative, empty, or non-numeric input is 0, and
/// values past u32::MAX saturate.
pub fn parse_seconds(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if negative || digits.is_empty() {
        return 0;
    }

    digits
        .bytes()
        .fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

/// Tab title with the site suffix and unread-count prefix removed
///
/// "(3) Some Video - YouTube" → "Some Video"
pub fn clean_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end();
    let mut title = trimmed.strip_suffix(TITLE_SUFFIX).unwrap_or(trimmed).trim();

    if let Some(rest) = title.strip_prefix('(') {
        if let Some((count, after)) = rest.split_once(") ") {
            if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit() || c == '+') {
                title = after.trim();
            }
        }
    }

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Accept the shapes older writers left behind: numbers, numeric strings, null.
/// Anything else reads as 0.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(u64),
        Signed(i64),
        Fractional(f64),
        Text(String),
        Missing(()),
        Other(IgnoredAny),
    }

    Ok(match Seconds::deserialize(deserializer)? {
        Seconds::Whole(n) => u32::try_from(n).unwrap_or(u32::MAX),
        Seconds::Signed(_) => 0,
        Seconds::Fractional(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
        Seconds::Fractional(_) => 0,
        Seconds::Text(s) => parse_seconds(&s),
        Seconds::Missing(()) | Seconds::Other(_) => 0,
    })
}

/// A title that isn't a string is treated as no title
fn lenient_title<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Title {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Title::deserialize(deserializer)? {
        Title::Text(title) => Some(title),
        Title::Other(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_setting_creation() {
        let setting = TrimSetting::new(10, 20, Some("Intro".to_string())).unwrap();

        assert_eq!(setting.start, 10);
        assert_eq!(setting.end, 20);
        assert_eq!(setting.window(), TrimWindow { start: 10, end: 20 });
    }

    #[test]
    fn test_window_validation() {
        assert!(TrimWindow::new(10, 0).is_ok());
        assert!(TrimWindow::new(0, 0).is_ok());
        assert!(TrimWindow::new(0, 5).is_ok());
        assert_eq!(
            TrimWindow::new(30, 20),
            Err(TrimError::InvalidWindow { start: 30, end: 20 })
        );
        assert_eq!(
            TrimWindow::new(20, 20),
            Err(TrimError::InvalidWindow { start: 20, end: 20 })
        );
    }

    #[test]
    fn test_window_is_active() {
        assert!(!TrimWindow::NONE.is_active());
        assert!(TrimWindow { start: 3, end: 0 }.is_active());
        assert!(TrimWindow { start: 0, end: 3 }.is_active());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let untitled = TrimSetting::default();
        let blank = TrimSetting { title: Some(String::new()), ..TrimSetting::default() };
        let titled = TrimSetting { title: Some("Talk".to_string()), ..TrimSetting::default() };

        assert_eq!(untitled.label("abc"), "abc");
        assert_eq!(blank.label("abc"), "abc");
        assert_eq!(titled.label("abc"), "Talk");
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("42"), 42);
        assert_eq!(parse_seconds("  42s"), 42);
        assert_eq!(parse_seconds("+7"), 7);
        assert_eq!(parse_seconds("12.9"), 12);
        assert_eq!(parse_seconds(""), 0);
        assert_eq!(parse_seconds("abc"), 0);
        assert_eq!(parse_seconds("-5"), 0);
        assert_eq!(parse_seconds("99999999999"), u32::MAX);
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Some Video - YouTube"), Some("Some Video".to_string()));
        assert_eq!(clean_title("(3) Some Video - YouTube"), Some("Some Video".to_string()));
        assert_eq!(clean_title("(99+) Some Video - YouTube"), Some("Some Video".to_string()));
        assert_eq!(clean_title("(Live) Concert"), Some("(Live) Concert".to_string()));
        assert_eq!(clean_title(" - YouTube"), None);
        assert_eq!(clean_title(""), None);
    }

    #[test]
    fn test_lenient_decoding() {
        let json = r#"{"start": "15", "end": 12.9}"#;
        let setting: TrimSetting = serde_json::from_str(json).unwrap();
        assert_eq!(setting, TrimSetting { start: 15, end: 12, title: None });

        let json = r#"{"start": null, "end": "", "title": "Clip"}"#;
        let setting: TrimSetting = serde_json::from_str(json).unwrap();
        assert_eq!(setting.window(), TrimWindow::NONE);
        assert_eq!(setting.title.as_deref(), Some("Clip"));

        let json = r#"{"start": -4, "extra": true}"#;
        let setting: TrimSetting = serde_json::from_str(json).unwrap();
        assert_eq!(setting.window(), TrimWindow::NONE);
    }

    #[test]
    fn test_unparseable_values_decode_to_zero() {
        let setting: TrimSetting = serde_json::from_str(r#"{"start": true, "end": 5}"#).unwrap();
        assert_eq!(setting.window(), TrimWindow { start: 0, end: 5 });

        let setting: TrimSetting = serde_json::from_str(r#"{"start": [1], "end": {"s": 2}}"#).unwrap();
        assert_eq!(setting.window(), TrimWindow::NONE);

        let setting: TrimSetting = serde_json::from_str(r#"{"start": 3, "title": 42}"#).unwrap();
        assert_eq!(setting, TrimSetting { start: 3, end: 0, title: None });
    }

    #[test]
    fn test_serialization_omits_missing_title() {
        let setting = TrimSetting { start: 10, end: 0, title: None };
        let json = serde_json::to_string(&setting).unwrap();
        assert_eq!(json, r#"{"start":10,"end":0}"#);
    }

    #[test]
    fn test_active_tab_ignores_extra_fields() {
        let json = r#"{"id": 7, "url": "https://youtu.be/abc", "title": "A", "pinned": false}"#;
        let tab: ActiveTab = serde_json::from_str(json).unwrap();
        assert_eq!(tab.url, "https://youtu.be/abc");
        assert_eq!(tab.title, "A");
    }
}
