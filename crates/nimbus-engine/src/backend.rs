//! The seam between the control plane and the rendering engine.
//!
//! Implementations own the actual browsable surfaces (wry webviews in
//! production) and must only ever be called from the ui context. Script
//! execution is completion-based: the engine has no synchronous way to
//! return a value, so the caller hands over a oneshot sender and awaits it
//! off-thread.

use nimbus_common::{EngineError, Frame, ViewId};

/// Delivers the engine's raw script-completion payload. If the waiting
/// client has already given up, the send fails and the payload is dropped.
pub type ScriptResultSender = tokio::sync::oneshot::Sender<String>;

/// Events surfaced by the backend. The engine pump applies these to the
/// tab registry before every marshaled unit of work runs.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A navigation has started. Carries the target URL.
    LoadStarted { view: ViewId, url: String },
    /// The page has fully loaded.
    LoadFinished { view: ViewId, url: String },
    /// Document title changed.
    TitleChanged { view: ViewId, title: String },
}

/// Operations the control plane needs from a rendering engine.
pub trait EngineBackend {
    /// Create a new browsable surface and begin loading `url`.
    fn create_view(&mut self, url: &str) -> Result<ViewId, EngineError>;

    /// Tear down a surface. The id is invalid afterwards.
    fn destroy_view(&mut self, view: ViewId) -> Result<(), EngineError>;

    /// Bring a surface to the front; called when the active tab changes.
    fn show_view(&mut self, view: ViewId) -> Result<(), EngineError>;

    fn navigate(&mut self, view: ViewId, url: &str) -> Result<(), EngineError>;

    fn go_back(&mut self, view: ViewId) -> Result<(), EngineError>;

    fn go_forward(&mut self, view: ViewId) -> Result<(), EngineError>;

    fn reload(&mut self, view: ViewId, ignore_cache: bool) -> Result<(), EngineError>;

    /// Run `code` in the page and deliver the raw completion payload
    /// through `result`. Fire-and-forget from the ui context's point of
    /// view; the payload format is the engine's own encoding.
    fn execute_script(
        &mut self,
        view: ViewId,
        code: &str,
        result: ScriptResultSender,
    ) -> Result<(), EngineError>;

    /// Capture the current viewport pixels of a surface.
    fn capture_viewport(&mut self, view: ViewId) -> Result<Frame, EngineError>;

    /// Host window resized. Surfaces share the window bounds; backends
    /// without native surfaces ignore this.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Drain pending engine events.
    fn poll_events(&mut self) -> Vec<EngineEvent>;
}
