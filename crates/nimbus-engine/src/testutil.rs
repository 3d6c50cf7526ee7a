//! Scripted in-memory backend for unit tests.

use nimbus_common::{EngineError, Frame, ViewId};

use crate::backend::{EngineBackend, EngineEvent, ScriptResultSender};

pub struct MockBackend {
    next_id: u64,
    views: Vec<ViewId>,
    pending: Vec<EngineEvent>,
    /// When false, views emit LoadStarted but never finish loading.
    finish_loads: bool,
    /// When true, capture_viewport returns a malformed frame.
    broken_capture: bool,
    /// Payload delivered to every execute_script call.
    pub script_payload: String,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            views: Vec::new(),
            pending: Vec::new(),
            finish_loads: true,
            broken_capture: false,
            script_payload: r#"{"success":true,"type":"undefined","result":null}"#.into(),
        }
    }

    /// A backend whose pages never finish loading.
    pub fn stalling() -> Self {
        Self {
            finish_loads: false,
            ..Self::new()
        }
    }

    pub fn with_broken_capture() -> Self {
        Self {
            broken_capture: true,
            ..Self::new()
        }
    }

    fn check(&self, view: ViewId) -> Result<(), EngineError> {
        if self.views.contains(&view) {
            Ok(())
        } else {
            Err(EngineError::ViewGone)
        }
    }

    fn start_load(&mut self, view: ViewId, url: &str) {
        self.pending.push(EngineEvent::LoadStarted {
            view,
            url: url.to_string(),
        });
        if self.finish_loads {
            self.pending.push(EngineEvent::LoadFinished {
                view,
                url: url.to_string(),
            });
        }
    }
}

impl EngineBackend for MockBackend {
    fn create_view(&mut self, url: &str) -> Result<ViewId, EngineError> {
        let view = ViewId(self.next_id);
        self.next_id += 1;
        self.views.push(view);
        self.start_load(view, url);
        Ok(view)
    }

    fn destroy_view(&mut self, view: ViewId) -> Result<(), EngineError> {
        self.check(view)?;
        self.views.retain(|v| *v != view);
        Ok(())
    }

    fn show_view(&mut self, view: ViewId) -> Result<(), EngineError> {
        self.check(view)
    }

    fn navigate(&mut self, view: ViewId, url: &str) -> Result<(), EngineError> {
        self.check(view)?;
        self.start_load(view, url);
        Ok(())
    }

    fn go_back(&mut self, view: ViewId) -> Result<(), EngineError> {
        self.check(view)?;
        self.start_load(view, "https://history.test/back");
        Ok(())
    }

    fn go_forward(&mut self, view: ViewId) -> Result<(), EngineError> {
        self.check(view)?;
        self.start_load(view, "https://history.test/forward");
        Ok(())
    }

    fn reload(&mut self, view: ViewId, _ignore_cache: bool) -> Result<(), EngineError> {
        self.check(view)?;
        self.start_load(view, "https://history.test/reload");
        Ok(())
    }

    fn execute_script(
        &mut self,
        view: ViewId,
        _code: &str,
        result: ScriptResultSender,
    ) -> Result<(), EngineError> {
        self.check(view)?;
        let _ = result.send(self.script_payload.clone());
        Ok(())
    }

    fn capture_viewport(&mut self, view: ViewId) -> Result<Frame, EngineError> {
        self.check(view)?;
        if self.broken_capture {
            return Ok(Frame {
                width: 4,
                height: 4,
                rgba: Vec::new(),
            });
        }
        Ok(Frame {
            width: 2,
            height: 2,
            rgba: vec![0xff; 16],
        })
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }
}
