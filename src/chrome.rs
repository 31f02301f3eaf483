/// Bindings to the extension APIs the host browser provides
use crate::error::StoreError;
use crate::trim_data::ActiveTab;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    async fn storage_local_get(keys: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    async fn storage_local_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn storage_on_changed_add_listener(callback: &js_sys::Function);

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn tabs_query(query_info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = create)]
    async fn tabs_create(create_properties: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    active: bool,
    current_window: bool,
}

#[derive(Serialize)]
struct CreateTab<'a> {
    url: &'a str,
}

/// Serializer that turns maps into plain objects, which chrome.storage expects
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, StoreError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(StoreError::Encode)
}

/// Read one key; resolves to `undefined` when the key was never written
pub async fn get_item(key: &str) -> Result<JsValue, StoreError> {
    let items = storage_local_get(key).await.map_err(StoreError::backend)?;
    js_sys::Reflect::get(&items, &JsValue::from_str(key)).map_err(StoreError::backend)
}

/// Write one key, replacing whatever was stored there
pub async fn set_item(key: &str, value: JsValue) -> Result<(), StoreError> {
    let items = js_sys::Object::new();
    js_sys::Reflect::set(&items, &JsValue::from_str(key), &value).map_err(StoreError::backend)?;
    storage_local_set(items.into()).await.map_err(StoreError::backend)?;
    Ok(())
}

/// Register a storage change listener for the page lifetime
///
/// The callback gets `(changes, areaName)`. The closure is leaked and lives
/// as long as the extension context.
pub fn on_storage_changed(callback: impl FnMut(JsValue, JsValue) + 'static) {
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(JsValue, JsValue)>);
    storage_on_changed_add_listener(closure.as_ref().unchecked_ref());
    closure.forget();
}

/// The focused tab of the current window, if any
pub async fn active_tab() -> Result<Option<ActiveTab>, StoreError> {
    let query = to_js(&TabQuery {
        active: true,
        current_window: true,
    })?;
    let tabs_js = tabs_query(query).await.map_err(StoreError::backend)?;
    let tabs: Vec<ActiveTab> = serde_wasm_bindgen::from_value(tabs_js).map_err(StoreError::Decode)?;
    Ok(tabs.into_iter().next())
}

pub async fn open_tab(url: &str) -> Result<(), StoreError> {
    let props = to_js(&CreateTab { url })?;
    tabs_create(props).await.map_err(StoreError::backend)?;
    Ok(())
}
