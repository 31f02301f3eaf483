/// Popup UI: edit the active video's trim and manage every saved trim

use crate::chrome;
use crate::error::{StoreError, TrimError};
use crate::storage::{TrimSettings, TrimStore};
use crate::trim_data::{TrimSetting, clean_title, parse_seconds};
use crate::ui::components::{SecondsInput, Status, StatusLine, TrimRow};
use crate::video_id;
use patternfly_yew::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum Page {
    Loading,
    NotAVideo,
    Video { video_id: String, title: Option<String> },
}

impl Page {
    fn video_id(&self) -> Option<&str> {
        match self {
            Page::Video { video_id, .. } => Some(video_id.as_str()),
            _ => None,
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let page = use_state(|| Page::Loading);
    let start_input = use_state(String::new);
    let end_input = use_state(String::new);
    let status = use_state(|| Status::Neutral("Loading...".to_string()));
    let settings = use_state(TrimSettings::new);
    let confirm_clear_all = use_state(|| false);

    // Follow store changes, then resolve the active tab and load trims
    {
        let page = page.clone();
        let start_input = start_input.clone();
        let end_input = end_input.clone();
        let status = status.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            let live = Rc::new(RefCell::new(LiveSettings::default()));

            {
                let live = Rc::clone(&live);
                let start_input = start_input.clone();
                let end_input = end_input.clone();
                let settings = settings.clone();
                TrimStore::on_change(move |changed| {
                    let mut live = live.borrow_mut();
                    live.record_change(&changed);
                    if let Some(id) = &live.video_id {
                        fill_inputs(&changed, id, &start_input, &end_input);
                    }
                    settings.set(changed);
                });
            }

            spawn_local(async move {
                let tab = match chrome::active_tab().await {
                    Ok(tab) => tab.unwrap_or_default(),
                    Err(e) => {
                        log::warn!("Failed to query active tab: {}", e);
                        Default::default()
                    }
                };

                let resolved = video_id::resolve(&tab.url);
                match &resolved {
                    Some(id) => {
                        status.set(Status::Neutral(format!("Video ID: {}", id)));
                        page.set(Page::Video {
                            video_id: id.clone(),
                            title: clean_title(&tab.title),
                        });
                    }
                    None => {
                        status.set(Status::Warn("This tab is not a YouTube video page.".to_string()));
                        page.set(Page::NotAVideo);
                    }
                }
                live.borrow_mut().video_id = resolved.clone();

                match TrimStore::get_all().await {
                    Ok(loaded) => {
                        let current = live.borrow().settle_load(loaded);
                        if let Some(id) = &resolved {
                            fill_inputs(&current, id, &start_input, &end_input);
                        }
                        settings.set(current);
                    }
                    Err(e) => status.set(Status::Warn(format!("Failed to load trims: {}", e))),
                }
            });
            || ()
        });
    }

    let on_start_input = {
        let start_input = start_input.clone();
        Callback::from(move |value: String| start_input.set(value))
    };

    let on_end_input = {
        let end_input = end_input.clone();
        Callback::from(move |value: String| end_input.set(value))
    };

    let on_save = {
        let page = page.clone();
        let start_input = start_input.clone();
        let end_input = end_input.clone();
        let status = status.clone();

        Callback::from(move |_| {
            let Page::Video { video_id, title } = (*page).clone() else {
                return;
            };

            let setting = match build_setting(&start_input, &end_input, title) {
                Ok(setting) => setting,
                Err(e) => {
                    status.set(Status::Warn(e.to_string()));
                    return;
                }
            };

            let status = status.clone();
            spawn_local(async move {
                match TrimStore::set(&video_id, setting).await {
                    Ok(_) => status.set(Status::Ok("Saved for this video.".to_string())),
                    Err(e) => status.set(Status::Warn(failure_message("save", &e))),
                }
            });
        })
    };

    let on_clear = {
        let page = page.clone();
        let start_input = start_input.clone();
        let end_input = end_input.clone();
        let status = status.clone();

        Callback::from(move |_| {
            let Some(video_id) = page.video_id().map(str::to_string) else {
                return;
            };

            let start_input = start_input.clone();
            let end_input = end_input.clone();
            let status = status.clone();
            spawn_local(async move {
                match TrimStore::remove(&video_id).await {
                    Ok(_) => {
                        start_input.set(String::new());
                        end_input.set(String::new());
                        status.set(Status::Ok("Cleared for this video.".to_string()));
                    }
                    Err(e) => status.set(Status::Warn(failure_message("clear", &e))),
                }
            });
        })
    };

    let on_request_clear_all = {
        let confirm_clear_all = confirm_clear_all.clone();
        Callback::from(move |_| confirm_clear_all.set(true))
    };

    let on_cancel_clear_all = {
        let confirm_clear_all = confirm_clear_all.clone();
        Callback::from(move |_| confirm_clear_all.set(false))
    };

    let on_confirm_clear_all = {
        let confirm_clear_all = confirm_clear_all.clone();
        let status = status.clone();

        Callback::from(move |_| {
            confirm_clear_all.set(false);

            let status = status.clone();
            spawn_local(async move {
                match TrimStore::clear().await {
                    Ok(_) => status.set(Status::Ok("Cleared all saved trims.".to_string())),
                    Err(e) => status.set(Status::Warn(failure_message("clear all", &e))),
                }
            });
        })
    };

    let on_refresh = {
        let page = page.clone();
        let start_input = start_input.clone();
        let end_input = end_input.clone();
        let status = status.clone();
        let settings = settings.clone();

        Callback::from(move |_| {
            let video_id = page.video_id().map(str::to_string);
            let start_input = start_input.clone();
            let end_input = end_input.clone();
            let status = status.clone();
            let settings = settings.clone();

            spawn_local(async move {
                match TrimStore::get_all().await {
                    Ok(loaded) => {
                        if let Some(id) = &video_id {
                            fill_inputs(&loaded, id, &start_input, &end_input);
                        }
                        settings.set(loaded);
                    }
                    Err(e) => status.set(Status::Warn(failure_message("refresh", &e))),
                }
            });
        })
    };

    let on_open = Callback::from(move |id: String| {
        spawn_local(async move {
            if let Err(e) = chrome::open_tab(&video_id::watch_url(&id)).await {
                log::warn!("Failed to open {}: {}", id, e);
            }
        });
    });

    let on_remove = {
        let status = status.clone();

        Callback::from(move |video_id: String| {
            let status = status.clone();
            spawn_local(async move {
                if let Err(e) = TrimStore::remove(&video_id).await {
                    status.set(Status::Warn(failure_message("remove", &e)));
                }
            });
        })
    };

    let is_video = matches!(*page, Page::Video { .. });
    let entries = settings.sorted_entries();

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Clip Window"}</h1>

            <StatusLine status={(*status).clone()} />

            <div class="inputs-row">
                <SecondsInput
                    id="start"
                    label="Start (s)"
                    value={(*start_input).clone()}
                    disabled={!is_video}
                    oninput={on_start_input}
                />
                <SecondsInput
                    id="end"
                    label="End (s)"
                    value={(*end_input).clone()}
                    disabled={!is_video}
                    oninput={on_end_input}
                />
            </div>

            <div class="flex-row-gap">
                <Button onclick={on_save} disabled={!is_video} variant={ButtonVariant::Primary}>
                    {"Save"}
                </Button>
                <Button onclick={on_clear} disabled={!is_video} variant={ButtonVariant::Secondary}>
                    {"Clear"}
                </Button>
            </div>

            <div class="saved-header">
                <h2 class="saved-title">{format!("Saved trims ({})", settings.len())}</h2>
                <Button onclick={on_refresh} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"Refresh"}
                </Button>
                if *confirm_clear_all {
                    <Button onclick={on_confirm_clear_all} variant={ButtonVariant::Danger} size={ButtonSize::Small}>
                        {"Confirm"}
                    </Button>
                    <Button onclick={on_cancel_clear_all} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                        {"Cancel"}
                    </Button>
                } else {
                    <Button
                        onclick={on_request_clear_all}
                        disabled={settings.is_empty()}
                        variant={ButtonVariant::Danger}
                        size={ButtonSize::Small}
                    >
                        {"Clear all"}
                    </Button>
                }
            </div>

            if *confirm_clear_all {
                <Alert r#type={AlertType::Warning} title={format!("Delete all {} saved trims?", settings.len())} inline={true}>
                </Alert>
            }

            if entries.is_empty() {
                <div class="empty-state">
                    <p>{"No saved trims yet."}</p>
                </div>
            } else {
                <div class="trims-list">
                    {for entries.into_iter().map(|(id, setting)| html! {
                        <TrimRow
                            key={id.to_string()}
                            video_id={id.to_string()}
                            setting={setting.clone()}
                            on_open={on_open.clone()}
                            on_remove={on_remove.clone()}
                        />
                    })}
                </div>
            }
        </div>
    }
}

/// What the mount effect's store listener has seen so far
#[derive(Default)]
struct LiveSettings {
    video_id: Option<String>,
    changed: Option<TrimSettings>,
}

impl LiveSettings {
    fn record_change(&mut self, changed: &TrimSettings) {
        self.changed = Some(changed.clone());
    }

    /// The initial load, unless a change notification already replaced it
    fn settle_load(&self, loaded: TrimSettings) -> TrimSettings {
        self.changed.clone().unwrap_or(loaded)
    }
}

// Helper functions

/// Input field values for a video: blank when nothing is saved
fn form_values(settings: &TrimSettings, video_id: &str) -> (String, String) {
    settings
        .get(video_id)
        .map(|setting| (setting.start.to_string(), setting.end.to_string()))
        .unwrap_or_default()
}

fn fill_inputs(
    settings: &TrimSettings,
    video_id: &str,
    start_input: &UseStateHandle<String>,
    end_input: &UseStateHandle<String>,
) {
    let (start, end) = form_values(settings, video_id);
    start_input.set(start);
    end_input.set(end);
}

fn build_setting(start_input: &str, end_input: &str, title: Option<String>) -> Result<TrimSetting, TrimError> {
    TrimSetting::new(parse_seconds(start_input), parse_seconds(end_input), title)
}

fn failure_message(action: &str, err: &StoreError) -> String {
    match err {
        StoreError::Invalid(e) => e.to_string(),
        other => format!("Failed to {}: {}", action, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_setting_parses_inputs() {
        let setting = build_setting("10", "", Some("Talk".to_string())).unwrap();
        assert_eq!(setting, TrimSetting { start: 10, end: 0, title: Some("Talk".to_string()) });
    }

    #[test]
    fn test_build_setting_rejects_end_before_start() {
        assert_eq!(
            build_setting("30", "20", None),
            Err(TrimError::InvalidWindow { start: 30, end: 20 })
        );
        assert!(build_setting("abc", "5", None).is_ok());
    }

    #[test]
    fn test_form_values() {
        let mut settings = TrimSettings::new();
        settings.upsert("abc", TrimSetting { start: 10, end: 0, title: None });

        assert_eq!(form_values(&settings, "abc"), ("10".to_string(), "0".to_string()));
        assert_eq!(form_values(&settings, "missing"), (String::new(), String::new()));
    }

    #[test]
    fn test_change_before_initial_load_wins() {
        let mut stale = TrimSettings::new();
        stale.upsert("abc", TrimSetting { start: 1, end: 0, title: None });
        let mut fresh = TrimSettings::new();
        fresh.upsert("abc", TrimSetting { start: 9, end: 0, title: None });

        let mut live = LiveSettings::default();
        assert_eq!(live.settle_load(stale.clone()), stale);

        live.record_change(&fresh);
        assert_eq!(live.settle_load(stale), fresh);
    }

    #[test]
    fn test_failure_message() {
        let invalid = StoreError::Invalid(TrimError::InvalidWindow { start: 3, end: 1 });
        assert_eq!(failure_message("save", &invalid), "End must be greater than Start (3s >= 1s)");

        let backend = StoreError::Backend("quota".to_string());
        assert_eq!(
            failure_message("save", &backend),
            "Failed to save: storage backend rejected the request: quota"
        );
    }
}
