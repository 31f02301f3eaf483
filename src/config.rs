/// Compile-time settings shared by the content script and the popup

/// Key of the single chrome.storage.local record holding every trim setting
pub const STORAGE_KEY: &str = "youtubeTimers";

/// `areaName` that chrome.storage.onChanged reports for that record
pub const STORAGE_AREA: &str = "local";

/// Event the host page dispatches on `window` after an in-app navigation
pub const NAVIGATE_FINISH_EVENT: &str = "yt-navigate-finish";

/// Prefix of the canonical watch URL; the video ID is appended
pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Suffix the host appends to every tab title
pub const TITLE_SUFFIX: &str = " - YouTube";

#[cfg(debug_assertions)]
pub const LOG_LEVEL: log::Level = log::Level::Debug;

#[cfg(not(debug_assertions))]
pub const LOG_LEVEL: log::Level = log::Level::Info;
