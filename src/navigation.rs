/// Tracks which video the page is showing and keeps the enforcer in step
use crate::enforcer::{EnforcerState, PlaybackEnforcer, VideoHandle};
use crate::storage::TrimSettings;
use crate::trim_data::{TrimSetting, TrimWindow};
use crate::video_id;

/// Everything known about the current video for one page lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnforcementSession {
    pub video_id: Option<String>,
    pub window: TrimWindow,
}

impl EnforcementSession {
    /// Fresh session for a resolved page; the window stays closed until loaded
    pub fn for_url(url: &str) -> Self {
        EnforcementSession {
            video_id: video_id::resolve(url),
            window: TrimWindow::NONE,
        }
    }

    pub fn is_for(&self, video_id: &str) -> bool {
        self.video_id.as_deref() == Some(video_id)
    }
}

/// Owns the session and the enforcer; every page signal funnels through here
pub struct NavigationWatcher<V: VideoHandle> {
    session: EnforcementSession,
    enforcer: PlaybackEnforcer<V>,
}

impl<V: VideoHandle> NavigationWatcher<V> {
    pub fn new() -> Self {
        NavigationWatcher {
            session: EnforcementSession::default(),
            enforcer: PlaybackEnforcer::new(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &EnforcementSession {
        &self.session
    }

    #[cfg(test)]
    pub fn enforcer(&self) -> &PlaybackEnforcer<V> {
        &self.enforcer
    }

    /// A subtree mutation happened: bind to whatever video is on the page now
    pub fn on_dom_mutation(&mut self, video: Option<V>) {
        let Some(video) = video else {
            return;
        };

        let was_unbound = self.enforcer.state() == EnforcerState::Unbound;
        self.enforcer.attach(video);
        if was_unbound {
            log::debug!("Found video element");
        }
    }

    /// Navigation finished: start a new session and bind to the page's video
    ///
    /// Returns the video ID whose trim the caller should fetch and hand to
    /// `finish_reload`. With no ID the window is left at {0, 0}.
    pub fn begin_reload(&mut self, url: &str, video: Option<V>) -> Option<String> {
        self.session = EnforcementSession::for_url(url);
        self.enforcer.set_window(self.session.window);

        match &self.session.video_id {
            Some(id) => log::debug!("Navigated to video {}", id),
            None => log::debug!("Navigated away from any video"),
        }

        self.on_dom_mutation(video);
        self.session.video_id.clone()
    }

    /// Apply a fetched trim if the page still shows that video
    pub fn finish_reload(&mut self, video_id: &str, setting: &TrimSetting) -> bool {
        if !self.session.is_for(video_id) {
            log::debug!("Dropping trim for {}; page moved on", video_id);
            return false;
        }

        self.session = EnforcementSession {
            video_id: Some(video_id.to_string()),
            window: setting.window(),
        };
        if self.session.window.is_active() {
            log::debug!("Enforcing {:?} on {}", self.session.window, video_id);
        }
        self.enforcer.set_window(self.session.window);
        true
    }

    /// The stored map changed in some context: re-read our entry
    pub fn on_store_change(&mut self, settings: &TrimSettings) {
        let Some(video_id) = self.session.video_id.clone() else {
            return;
        };

        let window = settings
            .get(&video_id)
            .map(TrimSetting::window)
            .unwrap_or(TrimWindow::NONE);

        self.session = EnforcementSession {
            video_id: Some(video_id),
            window,
        };
        self.enforcer.set_window(window);
        self.enforcer.enforce_bounds();
    }
}

impl<V: VideoHandle> Default for NavigationWatcher<V> {
    fn default() -> Self {
        Self::new()
    }
}
