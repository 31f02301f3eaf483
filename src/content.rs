/// Content script entry: wires page signals into the navigation watcher
use crate::config::NAVIGATE_FINISH_EVENT;
use crate::navigation::NavigationWatcher;
use crate::storage::TrimStore;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlVideoElement, MutationObserver, MutationObserverInit};

type SharedWatcher = Rc<RefCell<NavigationWatcher<HtmlVideoElement>>>;

/// Boot the content script; errors only mean some signal isn't wired
pub fn start() -> Result<(), JsValue> {
    let watcher: SharedWatcher = Rc::new(RefCell::new(NavigationWatcher::new()));

    observe_mutations(&watcher)?;
    listen_for_navigation(&watcher, NAVIGATE_FINISH_EVENT)?;
    listen_for_navigation(&watcher, "popstate")?;

    {
        let watcher = Rc::clone(&watcher);
        TrimStore::on_change(move |settings| {
            watcher.borrow_mut().on_store_change(&settings);
        });
    }

    reload(&watcher);
    Ok(())
}

/// Re-resolve the video, rebind, and fetch its trim
fn reload(watcher: &SharedWatcher) {
    let url = current_url().unwrap_or_default();
    let pending = watcher.borrow_mut().begin_reload(&url, find_video_element());

    let Some(video_id) = pending else {
        return;
    };

    let watcher = Rc::clone(watcher);
    spawn_local(async move {
        match TrimStore::get(&video_id).await {
            Ok(setting) => {
                watcher.borrow_mut().finish_reload(&video_id, &setting);
            }
            Err(e) => log::warn!("Failed to load trim for {}: {}", video_id, e),
        }
    });
}

fn observe_mutations(watcher: &SharedWatcher) -> Result<(), JsValue> {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return Ok(());
    };

    let watcher = Rc::clone(watcher);
    let callback = Closure::wrap(Box::new(move |_records: JsValue, _observer: JsValue| {
        if let Ok(mut watcher) = watcher.try_borrow_mut() {
            watcher.on_dom_mutation(find_video_element());
        }
    }) as Box<dyn FnMut(JsValue, JsValue)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&root, &options)?;

    callback.forget();
    Ok(())
}

fn listen_for_navigation(watcher: &SharedWatcher, event: &str) -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };

    let watcher = Rc::clone(watcher);
    let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        reload(&watcher);
    }) as Box<dyn FnMut(_)>);

    window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// First `<video>` on the page; the host swaps it out across navigations
fn find_video_element() -> Option<HtmlVideoElement> {
    web_sys::window()?
        .document()?
        .query_selector("video")
        .ok()??
        .dyn_into::<HtmlVideoElement>()
        .ok()
}

fn current_url() -> Option<String> {
    web_sys::window()?.location().href().ok()
}
