/// Trim persistence on chrome.storage.local
use crate::chrome;
use crate::config::{STORAGE_AREA, STORAGE_KEY};
use crate::error::{StoreError, TrimError};
use crate::trim_data::{TrimSetting, TrimWindow};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use wasm_bindgen::JsValue;

/// Root storage record: every saved trim keyed by video ID
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TrimSettings {
    entries: BTreeMap<String, TrimSetting>,
}

impl TrimSettings {
    pub fn new() -> Self {
        TrimSettings {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, video_id: &str) -> Option<&TrimSetting> {
        self.entries.get(video_id)
    }

    /// Entry for a video, or the all-zero default when nothing is saved
    pub fn get_or_default(&self, video_id: &str) -> TrimSetting {
        self.get(video_id).cloned().unwrap_or_default()
    }

    /// Insert or replace one entry without validating it
    pub fn upsert(&mut self, video_id: &str, setting: TrimSetting) {
        self.entries.insert(video_id.to_string(), setting);
    }

    /// Validate then upsert; the map is untouched on rejection
    pub fn save(&mut self, video_id: &str, setting: TrimSetting) -> Result<(), TrimError> {
        TrimWindow::new(setting.start, setting.end)?;
        self.upsert(video_id, setting);
        Ok(())
    }

    pub fn remove(&mut self, video_id: &str) -> bool {
        self.entries.remove(video_id).is_some()
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries for display, ordered case-insensitively by label (title, else ID)
    pub fn sorted_entries(&self) -> Vec<(&str, &TrimSetting)> {
        let mut entries: Vec<(&str, &TrimSetting)> = self
            .entries
            .iter()
            .map(|(video_id, setting)| (video_id.as_str(), setting))
            .collect();

        entries.sort_by_cached_key(|(video_id, setting)| {
            (setting.label(video_id).to_lowercase(), video_id.to_string())
        });

        entries
    }

    /// Decode the stored record; `undefined`/`null` is an empty map
    pub fn from_js(value: JsValue) -> Result<TrimSettings, StoreError> {
        if value.is_null() || value.is_undefined() {
            return Ok(TrimSettings::new());
        }
        serde_wasm_bindgen::from_value(value).map_err(StoreError::Decode)
    }

    pub fn to_js(&self) -> Result<JsValue, StoreError> {
        chrome::to_js(self)
    }
}

/// An entry that isn't a trim object reads as the all-zero default, so one
/// bad value never hides the rest of the record
impl<'de> Deserialize<'de> for TrimSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Setting(TrimSetting),
            Unreadable(IgnoredAny),
        }

        let raw = BTreeMap::<String, Entry>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .map(|(video_id, entry)| {
                let setting = match entry {
                    Entry::Setting(setting) => setting,
                    Entry::Unreadable(_) => TrimSetting::default(),
                };
                (video_id, setting)
            })
            .collect();

        Ok(TrimSettings { entries })
    }
}

/// Async access to the single trims record
///
/// Every write is a read-modify-write of the whole map. Nothing serializes
/// writers across the popup and content script: the last write wins.
pub struct TrimStore;

impl TrimStore {
    pub async fn get_all() -> Result<TrimSettings, StoreError> {
        let stored = chrome::get_item(STORAGE_KEY).await?;
        TrimSettings::from_js(stored)
    }

    pub async fn get(video_id: &str) -> Result<TrimSetting, StoreError> {
        Ok(Self::get_all().await?.get_or_default(video_id))
    }

    /// Validate and persist one entry, returning the map as written
    pub async fn set(video_id: &str, setting: TrimSetting) -> Result<TrimSettings, StoreError> {
        let mut settings = Self::get_all().await?;
        settings.save(video_id, setting)?;
        Self::write(&settings).await?;
        Ok(settings)
    }

    /// Delete one entry; absent entries are left alone and nothing is written
    pub async fn remove(video_id: &str) -> Result<bool, StoreError> {
        let mut settings = Self::get_all().await?;
        if !settings.remove(video_id) {
            return Ok(false);
        }
        Self::write(&settings).await?;
        Ok(true)
    }

    pub async fn clear() -> Result<(), StoreError> {
        Self::write(&TrimSettings::new()).await
    }

    /// Call `callback` with the new map whenever the trims record changes,
    /// whichever context wrote it
    pub fn on_change(mut callback: impl FnMut(TrimSettings) + 'static) {
        chrome::on_storage_changed(move |changes, area| {
            match changed_settings(&changes, &area) {
                Ok(Some(settings)) => callback(settings),
                Ok(None) => {}
                Err(e) => log::warn!("Ignoring unreadable trims update: {}", e),
            }
        });
    }

    async fn write(settings: &TrimSettings) -> Result<(), StoreError> {
        chrome::set_item(STORAGE_KEY, settings.to_js()?).await
    }
}

/// New value of our key from a `chrome.storage.onChanged` payload; changes
/// in other storage areas are not ours
fn changed_settings(changes: &JsValue, area: &JsValue) -> Result<Option<TrimSettings>, StoreError> {
    if area.as_string().as_deref() != Some(STORAGE_AREA) {
        return Ok(None);
    }

    let change = js_sys::Reflect::get(changes, &JsValue::from_str(STORAGE_KEY))
        .map_err(StoreError::backend)?;
    if change.is_undefined() {
        return Ok(None);
    }

    let new_value = js_sys::Reflect::get(&change, &JsValue::from_str("newValue"))
        .map_err(StoreError::backend)?;
    TrimSettings::from_js(new_value).map(Some)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_from_js_missing_record_is_empty() {
        assert!(TrimSettings::from_js(JsValue::UNDEFINED).unwrap().is_empty());
        assert!(TrimSettings::from_js(JsValue::NULL).unwrap().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_from_js_plain_object() {
        let value = js_sys::JSON::parse(r#"{"abc":{"start":"10","end":20,"title":"T"}}"#).unwrap();
        let settings = TrimSettings::from_js(value).unwrap();

        assert_eq!(settings.get_or_default("abc").window(), TrimWindow { start: 10, end: 20 });
    }

    #[wasm_bindgen_test]
    fn test_to_js_writes_objects_not_maps() {
        let mut settings = TrimSettings::new();
        settings.upsert("abc", TrimSetting { start: 1, end: 2, title: None });

        let value = settings.to_js().unwrap();

        assert!(!value.is_instance_of::<js_sys::Map>());
        let entry = js_sys::Reflect::get(&value, &JsValue::from_str("abc")).unwrap();
        assert_eq!(js_sys::Reflect::get(&entry, &JsValue::from_str("end")).unwrap().as_f64(), Some(2.0));
    }

    #[wasm_bindgen_test]
    fn test_changed_settings_reads_new_value() {
        let local = JsValue::from_str("local");

        let changes = js_sys::JSON::parse(r#"{"youtubeTimers":{"newValue":{"abc":{"start":5,"end":0}}}}"#).unwrap();
        let settings = changed_settings(&changes, &local).unwrap().unwrap();
        assert_eq!(settings.get_or_default("abc").start, 5);

        let deleted = js_sys::JSON::parse(r#"{"youtubeTimers":{"oldValue":{}}}"#).unwrap();
        assert!(changed_settings(&deleted, &local).unwrap().unwrap().is_empty());

        let unrelated = js_sys::JSON::parse(r#"{"other":{"newValue":1}}"#).unwrap();
        assert!(changed_settings(&unrelated, &local).unwrap().is_none());
    }

    #[wasm_bindgen_test]
    fn test_changed_settings_ignores_other_areas() {
        let changes = js_sys::JSON::parse(r#"{"youtubeTimers":{"newValue":{"abc":{"start":5,"end":0}}}}"#).unwrap();

        assert!(changed_settings(&changes, &JsValue::from_str("sync")).unwrap().is_none());
        assert!(changed_settings(&changes, &JsValue::from_str("session")).unwrap().is_none());
    }
}
