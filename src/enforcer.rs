/// Playback clamping for the page's video element
use crate::trim_data::TrimWindow;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlVideoElement;

/// What a video element needs to offer for enforcement
pub trait VideoHandle: Clone + 'static {
    /// Keeps the registered listeners alive until `unsubscribe`
    type Listeners;

    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    fn pause(&self);

    /// True when both handles point at the same element
    fn same_element(&self, other: &Self) -> bool;

    /// Listen for "position advanced" (`timeupdate`) and "started" (`playing`)
    fn subscribe(&self, on_time_update: Box<dyn FnMut()>, on_playing: Box<dyn FnMut()>) -> Self::Listeners;

    /// Best-effort removal; errors are swallowed
    fn unsubscribe(&self, listeners: Self::Listeners);
}

/// Correction applied by one enforcement pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    None,
    SeekedToStart(u32),
    PausedAtEnd(u32),
}

/// Jump forward to `start` if playback is before it
pub fn enforce_start<V: VideoHandle>(window: TrimWindow, video: &V) -> Correction {
    let start = f64::from(window.start);
    if window.start > 0 && video.current_time() < start {
        video.set_current_time(start);
        return Correction::SeekedToStart(window.start);
    }
    Correction::None
}

/// Full clamp run on every position update
///
/// A start correction returns early so the end check waits for the next
/// event. Hitting `end` pauses and snaps exactly to it.
pub fn enforce_bounds<V: VideoHandle>(window: TrimWindow, video: &V) -> Correction {
    let correction = enforce_start(window, video);
    if correction != Correction::None {
        return correction;
    }

    let end = f64::from(window.end);
    if window.end > 0 && video.current_time() >= end {
        video.pause();
        video.set_current_time(end);
        return Correction::PausedAtEnd(window.end);
    }

    Correction::None
}

enum Binding<V: VideoHandle> {
    Unbound,
    Bound { video: V, listeners: V::Listeners },
}

/// Enforcer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcerState {
    Unbound,
    Bound,
}

/// Binds to one video element at a time and keeps playback inside the window
pub struct PlaybackEnforcer<V: VideoHandle> {
    window: Rc<Cell<TrimWindow>>,
    binding: Binding<V>,
}

impl<V: VideoHandle> PlaybackEnforcer<V> {
    pub fn new() -> Self {
        PlaybackEnforcer {
            window: Rc::new(Cell::new(TrimWindow::NONE)),
            binding: Binding::Unbound,
        }
    }

    pub fn state(&self) -> EnforcerState {
        match self.binding {
            Binding::Unbound => EnforcerState::Unbound,
            Binding::Bound { .. } => EnforcerState::Bound,
        }
    }

    pub fn window(&self) -> TrimWindow {
        self.window.get()
    }

    pub fn video(&self) -> Option<&V> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Bound { video, .. } => Some(video),
        }
    }

    /// Bind to `video`; a no-op when already bound to that element
    pub fn attach(&mut self, video: V) {
        if let Some(current) = self.video() {
            if current.same_element(&video) {
                return;
            }
        }

        self.detach();

        let on_time_update = {
            let window = Rc::clone(&self.window);
            let video = video.clone();
            Box::new(move || {
                log_correction(enforce_bounds(window.get(), &video));
            }) as Box<dyn FnMut()>
        };
        let on_playing = {
            let window = Rc::clone(&self.window);
            let video = video.clone();
            Box::new(move || {
                log_correction(enforce_start(window.get(), &video));
            }) as Box<dyn FnMut()>
        };

        let listeners = video.subscribe(on_time_update, on_playing);
        log::debug!("Bound to video element");
        self.binding = Binding::Bound { video, listeners };
        self.enforce_start();
    }

    /// Drop the current element's listeners, if any
    pub fn detach(&mut self) {
        if let Binding::Bound { video, listeners } = std::mem::replace(&mut self.binding, Binding::Unbound) {
            video.unsubscribe(listeners);
        }
    }

    /// Replace the window and apply the start clamp right away
    pub fn set_window(&mut self, window: TrimWindow) {
        self.window.set(window);
        self.enforce_start();
    }

    pub fn enforce_start(&self) -> Correction {
        self.video()
            .map(|video| log_correction(enforce_start(self.window(), video)))
            .unwrap_or(Correction::None)
    }

    pub fn enforce_bounds(&self) -> Correction {
        self.video()
            .map(|video| log_correction(enforce_bounds(self.window(), video)))
            .unwrap_or(Correction::None)
    }
}

impl<V: VideoHandle> Default for PlaybackEnforcer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VideoHandle> Drop for PlaybackEnforcer<V> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn log_correction(correction: Correction) -> Correction {
    match correction {
        Correction::SeekedToStart(start) => log::debug!("Seeked forward to start at {}s", start),
        Correction::PausedAtEnd(end) => log::debug!("Paused at end {}s", end),
        Correction::None => {}
    }
    correction
}

/// Closures registered on a real `<video>`
pub struct VideoListeners {
    time_update: Closure<dyn FnMut()>,
    playing: Closure<dyn FnMut()>,
}

impl VideoHandle for HtmlVideoElement {
    type Listeners = VideoListeners;

    fn current_time(&self) -> f64 {
        web_sys::HtmlMediaElement::current_time(self)
    }

    fn set_current_time(&self, seconds: f64) {
        web_sys::HtmlMediaElement::set_current_time(self, seconds);
    }

    fn pause(&self) {
        if let Err(e) = web_sys::HtmlMediaElement::pause(self) {
            log::debug!("pause() failed: {:?}", e);
        }
    }

    fn same_element(&self, other: &Self) -> bool {
        let other: &web_sys::Node = other;
        self.is_same_node(Some(other))
    }

    fn subscribe(&self, on_time_update: Box<dyn FnMut()>, on_playing: Box<dyn FnMut()>) -> VideoListeners {
        let listeners = VideoListeners {
            time_update: Closure::wrap(on_time_update),
            playing: Closure::wrap(on_playing),
        };

        let _ = self.add_event_listener_with_callback("timeupdate", listeners.time_update.as_ref().unchecked_ref());
        let _ = self.add_event_listener_with_callback("playing", listeners.playing.as_ref().unchecked_ref());

        listeners
    }

    fn unsubscribe(&self, listeners: VideoListeners) {
        let _ = self.remove_event_listener_with_callback("timeupdate", listeners.time_update.as_ref().unchecked_ref());
        let _ = self.remove_event_listener_with_callback("playing", listeners.playing.as_ref().unchecked_ref());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// In-memory stand-in for a `<video>` element
    #[derive(Clone)]
    pub struct FakeVideo {
        pub id: u32,
        inner: Rc<FakeVideoInner>,
    }

    #[derive(Default)]
    pub struct FakeVideoInner {
        time: Cell<f64>,
        paused: Cell<bool>,
        seeks: Cell<u32>,
        time_update: RefCell<Option<Box<dyn FnMut()>>>,
        playing: RefCell<Option<Box<dyn FnMut()>>>,
    }

    impl FakeVideo {
        pub fn new(id: u32) -> Self {
            FakeVideo {
                id,
                inner: Rc::new(FakeVideoInner::default()),
            }
        }

        pub fn at(id: u32, time: f64) -> Self {
            let video = Self::new(id);
            video.inner.time.set(time);
            video
        }

        pub fn time(&self) -> f64 {
            self.inner.time.get()
        }

        pub fn paused(&self) -> bool {
            self.inner.paused.get()
        }

        pub fn seeks(&self) -> u32 {
            self.inner.seeks.get()
        }

        pub fn is_subscribed(&self) -> bool {
            self.inner.time_update.borrow().is_some() && self.inner.playing.borrow().is_some()
        }

        /// Move the playhead as the media engine would, then fire `timeupdate`
        pub fn play_to(&self, time: f64) {
            self.inner.time.set(time);
            if let Some(callback) = self.inner.time_update.borrow_mut().as_mut() {
                callback();
            }
        }

        /// Move the playhead without firing any event, like a user scrub while paused
        pub fn scrub_to(&self, time: f64) {
            self.inner.time.set(time);
        }

        pub fn fire_playing(&self) {
            if let Some(callback) = self.inner.playing.borrow_mut().as_mut() {
                callback();
            }
        }
    }

    impl VideoHandle for FakeVideo {
        type Listeners = ();

        fn current_time(&self) -> f64 {
            self.inner.time.get()
        }

        fn set_current_time(&self, seconds: f64) {
            self.inner.time.set(seconds);
            self.inner.seeks.set(self.inner.seeks.get() + 1);
        }

        fn pause(&self) {
            self.inner.paused.set(true);
        }

        fn same_element(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.inner, &other.inner)
        }

        fn subscribe(&self, on_time_update: Box<dyn FnMut()>, on_playing: Box<dyn FnMut()>) {
            *self.inner.time_update.borrow_mut() = Some(on_time_update);
            *self.inner.playing.borrow_mut() = Some(on_playing);
        }

        fn unsubscribe(&self, _listeners: ()) {
            self.inner.time_update.borrow_mut().take();
            self.inner.playing.borrow_mut().take();
        }
    }
}
