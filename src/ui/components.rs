/// Reusable popup components

use crate::trim_data::{TrimSetting, TrimWindow};
use patternfly_yew::prelude::*;
use yew::prelude::*;

/// Message shown under the inputs
#[derive(Clone, PartialEq, Debug)]
pub enum Status {
    Neutral(String),
    Ok(String),
    Warn(String),
}

impl Status {
    fn class(&self) -> &'static str {
        match self {
            Status::Neutral(_) => "status",
            Status::Ok(_) => "status ok",
            Status::Warn(_) => "status warn",
        }
    }

    fn message(&self) -> &str {
        match self {
            Status::Neutral(msg) | Status::Ok(msg) | Status::Warn(msg) => msg,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    pub status: Status,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    html! {
        <p class={props.status.class()}>{props.status.message()}</p>
    }
}

#[derive(Properties, PartialEq)]
pub struct SecondsInputProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub value: String,
    pub disabled: bool,
    pub oninput: Callback<String>,
}

#[function_component(SecondsInput)]
pub fn seconds_input(props: &SecondsInputProps) -> Html {
    let oninput = props.oninput.reform(|e: InputEvent| {
        e.target_dyn_into::<web_sys::HtmlInputElement>()
            .map(|input| input.value())
            .unwrap_or_default()
    });

    html! {
        <label class="seconds-field">
            <span class="seconds-label">{props.label.clone()}</span>
            <input
                id={props.id.clone()}
                type="number"
                min="0"
                step="1"
                placeholder="0"
                value={props.value.clone()}
                disabled={props.disabled}
                {oninput}
                class="seconds-input"
            />
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub struct TrimRowProps {
    pub video_id: String,
    pub setting: TrimSetting,
    pub on_open: Callback<String>,
    pub on_remove: Callback<String>,
}

/// One saved trim in the list
#[function_component(TrimRow)]
pub fn trim_row(props: &TrimRowProps) -> Html {
    let on_open = props.on_open.reform({
        let video_id = props.video_id.clone();
        move |_| video_id.clone()
    });
    let on_remove = props.on_remove.reform({
        let video_id = props.video_id.clone();
        move |_| video_id.clone()
    });

    html! {
        <div class="trim-row">
            <div class="trim-content">
                <div class="trim-title" title={props.video_id.clone()}>
                    {props.setting.label(&props.video_id)}
                </div>
                <div class="trim-window">
                    {describe_window(props.setting.window())}
                </div>
            </div>
            <div class="trim-actions">
                <Button onclick={on_open} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"Open"}
                </Button>
                <Button onclick={on_remove} variant={ButtonVariant::Danger} size={ButtonSize::Small}>
                    {"✗"}
                </Button>
            </div>
        </div>
    }
}

/// "1:05 → 2:00", "from 0:10", "until 2:00", or "no limits"
pub fn describe_window(window: TrimWindow) -> String {
    match (window.start, window.end) {
        (0, 0) => "no limits".to_string(),
        (start, 0) => format!("from {}", format_clock(start)),
        (0, end) => format!("until {}", format_clock(end)),
        (start, end) => format!("{} → {}", format_clock(start), format_clock(end)),
    }
}

/// Seconds as m:ss, or h:mm:ss past the hour
pub fn format_clock(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
