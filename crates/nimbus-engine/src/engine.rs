//! The ui-context engine: backend + tab registry.
//!
//! All methods here run inside marshaled work on the ui context. The
//! runner pumps backend events into the registry before every unit, so
//! handlers always observe the freshest load states and URLs the engine
//! has reported.

use nimbus_common::{ControlError, Frame, LoadState, TabInfo};
use tracing::{debug, warn};

use crate::backend::{EngineBackend, EngineEvent, ScriptResultSender};
use crate::tabs::{Tab, TabRegistry};

pub struct Engine {
    backend: Box<dyn EngineBackend>,
    tabs: TabRegistry,
}

impl Engine {
    pub fn new(backend: Box<dyn EngineBackend>) -> Self {
        Self {
            backend,
            tabs: TabRegistry::new(),
        }
    }

    /// Apply pending backend events to the registry.
    pub fn pump(&mut self) {
        for event in self.backend.poll_events() {
            match event {
                EngineEvent::LoadStarted { view, url } => {
                    if let Some(tab) = self.tabs.find_by_view(view) {
                        tab.load_state = LoadState::Loading;
                        tab.url = url;
                    }
                }
                EngineEvent::LoadFinished { view, url } => {
                    if let Some(tab) = self.tabs.find_by_view(view) {
                        tab.load_state = LoadState::Loaded;
                        tab.url = url;
                    }
                }
                EngineEvent::TitleChanged { view, title } => {
                    if let Some(tab) = self.tabs.find_by_view(view) {
                        tab.title = title;
                    }
                }
            }
        }
    }

    /// Open a new tab on `url`, make it active, and return its index.
    pub fn create_tab(&mut self, url: &str) -> Result<usize, ControlError> {
        let view = self.backend.create_view(url)?;
        let index = self.tabs.push(Tab::new(view, url));
        if let Err(e) = self.backend.show_view(view) {
            warn!(%view, error = %e, "could not focus freshly created view");
        }
        debug!(%view, index, url, "tab created");
        Ok(index)
    }

    /// Close the tab at `index`. Later tabs renumber down by one.
    pub fn close_tab(&mut self, index: usize) -> Result<(), ControlError> {
        let removed = self.tabs.close(index)?;
        if let Err(e) = self.backend.destroy_view(removed.view) {
            warn!(view = %removed.view, error = %e, "backend failed to destroy view");
        }
        if let Ok(active) = self.tabs.active_index() {
            let view = self.tabs.get(active)?.view;
            let _ = self.backend.show_view(view);
        }
        debug!(index, remaining = self.tabs.len(), "tab closed");
        Ok(())
    }

    /// Make `index` the active tab and return it.
    pub fn switch_tab(&mut self, index: usize) -> Result<usize, ControlError> {
        self.tabs.switch(index)?;
        let view = self.tabs.get(index)?.view;
        self.backend.show_view(view)?;
        Ok(index)
    }

    pub fn tab_info(&self) -> TabInfo {
        self.tabs.info()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn active_index(&self) -> Result<usize, ControlError> {
        self.tabs.active_index()
    }

    /// Resolve the target of a `tabIndex?` parameter: validate and switch
    /// when given, otherwise use the active tab. Invalid indices fail
    /// without touching the active tab.
    pub fn resolve_target(&mut self, requested: Option<usize>) -> Result<usize, ControlError> {
        match requested {
            Some(index) => {
                if self.tabs.active_index().ok() != Some(index) {
                    self.switch_tab(index)?;
                }
                Ok(index)
            }
            None => self.tabs.active_index(),
        }
    }

    /// Begin navigating the tab at `index`. The tab is optimistically
    /// marked loading; the backend's own LoadStarted event would otherwise
    /// race the first load-state poll.
    pub fn navigate(&mut self, index: usize, url: &str) -> Result<(), ControlError> {
        let tab = self.tabs.get_mut(index)?;
        tab.load_state = LoadState::Loading;
        tab.url = url.to_string();
        let view = tab.view;
        self.backend.navigate(view, url)?;
        debug!(index, url, "navigation started");
        Ok(())
    }

    pub fn history_back(&mut self, index: usize) -> Result<(), ControlError> {
        let tab = self.tabs.get_mut(index)?;
        tab.load_state = LoadState::Loading;
        let view = tab.view;
        self.backend.go_back(view)?;
        Ok(())
    }

    pub fn history_forward(&mut self, index: usize) -> Result<(), ControlError> {
        let tab = self.tabs.get_mut(index)?;
        tab.load_state = LoadState::Loading;
        let view = tab.view;
        self.backend.go_forward(view)?;
        Ok(())
    }

    pub fn reload(&mut self, index: usize, ignore_cache: bool) -> Result<(), ControlError> {
        let tab = self.tabs.get_mut(index)?;
        tab.load_state = LoadState::Loading;
        let view = tab.view;
        self.backend.reload(view, ignore_cache)?;
        Ok(())
    }

    pub fn current_url(&self, index: usize) -> Result<String, ControlError> {
        Ok(self.tabs.get(index)?.url.clone())
    }

    pub fn load_state(&self, index: usize) -> Result<LoadState, ControlError> {
        Ok(self.tabs.get(index)?.load_state)
    }

    /// Kick off script execution on the tab at `index`; the raw completion
    /// payload arrives through `result`.
    pub fn execute_script(
        &mut self,
        index: usize,
        code: &str,
        result: ScriptResultSender,
    ) -> Result<(), ControlError> {
        let view = self.tabs.get(index)?.view;
        self.backend.execute_script(view, code, result)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
    }

    pub fn capture(&mut self, index: usize) -> Result<Frame, ControlError> {
        let view = self.tabs.get(index)?.view;
        let frame = self.backend.capture_viewport(view)?;
        if !frame.is_well_formed() {
            return Err(ControlError::Capture(
                "engine produced an empty or malformed frame".into(),
            ));
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBackend;
    use nimbus_common::ViewId;

    fn engine() -> Engine {
        Engine::new(Box::new(MockBackend::new()))
    }

    #[test]
    fn create_tab_appends_and_activates() {
        let mut e = engine();
        assert_eq!(e.create_tab("https://one.test").unwrap(), 0);
        assert_eq!(e.create_tab("https://two.test").unwrap(), 1);
        let info = e.tab_info();
        assert_eq!(info.count, 2);
        assert_eq!(info.active, Some(1));
    }

    #[test]
    fn pump_marks_tab_loaded() {
        let mut e = engine();
        e.create_tab("https://slow.test").unwrap();
        assert_eq!(e.load_state(0).unwrap(), LoadState::Loading);
        e.pump();
        assert_eq!(e.load_state(0).unwrap(), LoadState::Loaded);
        assert_eq!(e.current_url(0).unwrap(), "https://slow.test");
    }

    #[test]
    fn navigate_resets_load_state() {
        let mut e = engine();
        e.create_tab("https://a.test").unwrap();
        e.pump();
        e.navigate(0, "https://b.test").unwrap();
        assert_eq!(e.load_state(0).unwrap(), LoadState::Loading);
        assert_eq!(e.current_url(0).unwrap(), "https://b.test");
    }

    #[test]
    fn resolve_target_switches_when_requested() {
        let mut e = engine();
        e.create_tab("https://a.test").unwrap();
        e.create_tab("https://b.test").unwrap();
        assert_eq!(e.resolve_target(None).unwrap(), 1);
        assert_eq!(e.resolve_target(Some(0)).unwrap(), 0);
        assert_eq!(e.active_index().unwrap(), 0);
    }

    #[test]
    fn resolve_target_rejects_out_of_range() {
        let mut e = engine();
        e.create_tab("https://a.test").unwrap();
        let err = e.resolve_target(Some(5)).unwrap_err();
        assert!(matches!(err, ControlError::TabNotFound { index: 5, .. }));
        assert_eq!(e.active_index().unwrap(), 0);
    }

    #[test]
    fn close_tab_destroys_backend_view() {
        let mut e = engine();
        e.create_tab("https://a.test").unwrap();
        e.create_tab("https://b.test").unwrap();
        e.close_tab(0).unwrap();
        assert_eq!(e.tab_count(), 1);
        // The surviving tab renumbered to 0 and still resolves.
        assert_eq!(e.current_url(0).unwrap(), "https://b.test");
    }

    #[test]
    fn capture_rejects_malformed_frame() {
        let mut e = Engine::new(Box::new(MockBackend::with_broken_capture()));
        e.create_tab("https://a.test").unwrap();
        let err = e.capture(0).unwrap_err();
        assert!(matches!(err, ControlError::Capture(_)));
    }

    #[test]
    fn events_for_closed_views_are_ignored() {
        let mut e = engine();
        e.create_tab("https://a.test").unwrap();
        e.close_tab(0).unwrap();
        // The finish event for the destroyed view is still queued.
        e.pump();
        assert_eq!(e.tab_count(), 0);
        assert!(e.tabs.find_by_view(ViewId(0)).is_none());
    }
}
