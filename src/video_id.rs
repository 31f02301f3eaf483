/// Video ID extraction for the URL shapes the host serves
use crate::config::WATCH_URL_BASE;
use url::Url;

/// Extract the video ID from a page URL
///
/// Algorithm (first match wins):
/// 1. Parse the URL and drop a leading "www." from the hostname
/// 2. Host other than "*youtube.com" or "youtu.be" → None
/// 3. Non-empty `v` query parameter → that value (watch pages)
/// 4. Host ending in "youtube.com" with a `shorts/<id>` path pair → `<id>`
/// 5. Host "youtu.be" → first non-empty path segment
/// 6. Otherwise → None
///
/// Examples:
/// - https://www.youtube.com/watch?v=abc123 → abc123
/// - https://m.youtube.com/shorts/abc123?x=1 → abc123
/// - https://youtu.be/abc123?t=30 → abc123
/// - https://example.com/watch?v=abc123 → None
///
/// Anything that fails to parse is None; this classifies, it doesn't validate.
pub fn resolve(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let hostname = parsed.host_str()?;
    let host = hostname.strip_prefix("www.").unwrap_or(hostname);

    let is_site = host.ends_with("youtube.com");
    let is_short_link = host == "youtu.be";
    if !is_site && !is_short_link {
        return None;
    }

    if let Some(v) = query_param(&parsed, "v") {
        return Some(v);
    }

    let mut segments = path_segments(&parsed);

    if is_site {
        segments
            .skip_while(|segment| *segment != "shorts")
            .nth(1)
            .map(str::to_string)
    } else {
        segments.next().map(str::to_string)
    }
}

/// Canonical watch page for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_BASE, video_id)
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Non-empty path segments, empty for cannot-be-a-base URLs
fn path_segments(url: &Url) -> impl Iterator<Item = &str> {
    url.path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
}
