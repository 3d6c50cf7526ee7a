//! `EngineBackend` implementation over child webviews.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nimbus_common::{EngineError, Frame, ViewId};
use nimbus_engine::{EngineBackend, EngineEvent, ScriptResultSender};
use tracing::{debug, warn};
use wry::raw_window_handle::HasWindowHandle;
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

use crate::script::completion_wrapper;

/// Latest rendered viewport pixels, updated by the host's present path and
/// read by `capture_viewport`. wry has no screenshot API of its own, so the
/// host owns pixel production and this slot is the handoff point.
pub type FrameSlot = Arc<Mutex<Option<Frame>>>;

struct ViewEntry {
    webview: WebView,
}

/// The production backend: one wry webview per tab, all parented to the
/// host window and sharing its bounds. Must only be touched from the ui
/// context, like every [`EngineBackend`].
pub struct WryBackend<W: HasWindowHandle> {
    window: Arc<W>,
    bounds: Rect,
    views: HashMap<ViewId, ViewEntry>,
    next_view: u64,
    events: Arc<Mutex<Vec<EngineEvent>>>,
    frame_slot: FrameSlot,
}

impl<W: HasWindowHandle> WryBackend<W> {
    pub fn new(window: Arc<W>, width: u32, height: u32) -> Self {
        Self {
            window,
            bounds: window_bounds(width, height),
            views: HashMap::new(),
            next_view: 0,
            events: Arc::new(Mutex::new(Vec::new())),
            frame_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Hand out the frame slot so the host can publish viewport pixels.
    pub fn frame_slot(&self) -> FrameSlot {
        Arc::clone(&self.frame_slot)
    }

    fn entry(&self, view: ViewId) -> Result<&ViewEntry, EngineError> {
        self.views.get(&view).ok_or(EngineError::ViewGone)
    }

    fn run_script(&self, view: ViewId, js: &str) -> Result<(), EngineError> {
        self.entry(view)?
            .webview
            .evaluate_script(js)
            .map_err(|e| EngineError::Backend(e.to_string()))
    }
}

impl<W: HasWindowHandle> EngineBackend for WryBackend<W> {
    fn create_view(&mut self, url: &str) -> Result<ViewId, EngineError> {
        let view = ViewId(self.next_view);
        self.next_view += 1;

        let mut builder = WebViewBuilder::new()
            .with_bounds(self.bounds)
            .with_focused(false)
            .with_url(url);

        let events = Arc::clone(&self.events);
        builder = builder.with_on_page_load_handler(move |event, url| {
            let event = match event {
                PageLoadEvent::Started => EngineEvent::LoadStarted { view, url },
                PageLoadEvent::Finished => EngineEvent::LoadFinished { view, url },
            };
            if let Ok(mut queue) = events.lock() {
                queue.push(event);
            }
        });

        let events = Arc::clone(&self.events);
        builder = builder.with_document_title_changed_handler(move |title| {
            if let Ok(mut queue) = events.lock() {
                queue.push(EngineEvent::TitleChanged { view, title });
            }
        });

        let webview = builder
            .build_as_child(self.window.as_ref())
            .map_err(|e| EngineError::Backend(e.to_string()))?;

        debug!(%view, url, "webview created");
        self.views.insert(view, ViewEntry { webview });
        Ok(view)
    }

    fn destroy_view(&mut self, view: ViewId) -> Result<(), EngineError> {
        // Dropping the wry handle tears the native view down.
        self.views.remove(&view).ok_or(EngineError::ViewGone)?;
        debug!(%view, "webview destroyed");
        Ok(())
    }

    fn show_view(&mut self, view: ViewId) -> Result<(), EngineError> {
        if !self.views.contains_key(&view) {
            return Err(EngineError::ViewGone);
        }
        // Views are stacked at the same bounds; only the active one is
        // visible.
        for (id, entry) in &self.views {
            if let Err(e) = entry.webview.set_visible(*id == view) {
                warn!(view = %id, error = %e, "failed to toggle webview visibility");
            }
        }
        if let Err(e) = self.entry(view)?.webview.focus() {
            warn!(%view, error = %e, "failed to focus webview");
        }
        Ok(())
    }

    fn navigate(&mut self, view: ViewId, url: &str) -> Result<(), EngineError> {
        self.entry(view)?
            .webview
            .load_url(url)
            .map_err(|e| EngineError::Backend(e.to_string()))
    }

    fn go_back(&mut self, view: ViewId) -> Result<(), EngineError> {
        self.run_script(view, "history.back()")
    }

    fn go_forward(&mut self, view: ViewId) -> Result<(), EngineError> {
        self.run_script(view, "history.forward()")
    }

    fn reload(&mut self, view: ViewId, ignore_cache: bool) -> Result<(), EngineError> {
        // `reload(true)` is the legacy cache-bypass form; engines that
        // ignore the argument still perform a plain reload.
        let js = if ignore_cache {
            "location.reload(true)"
        } else {
            "location.reload()"
        };
        self.run_script(view, js)
    }

    fn execute_script(
        &mut self,
        view: ViewId,
        code: &str,
        result: ScriptResultSender,
    ) -> Result<(), EngineError> {
        let wrapped = completion_wrapper(code);
        // wry's callback is Fn and may in principle fire more than once;
        // the oneshot sender is consumed on the first payload.
        let slot = Mutex::new(Some(result));
        self.entry(view)?
            .webview
            .evaluate_script_with_callback(&wrapped, move |payload| {
                if let Ok(mut slot) = slot.lock() {
                    if let Some(tx) = slot.take() {
                        let _ = tx.send(payload);
                    }
                }
            })
            .map_err(|e| EngineError::Backend(e.to_string()))
    }

    fn capture_viewport(&mut self, view: ViewId) -> Result<Frame, EngineError> {
        self.entry(view)?;
        let slot = self
            .frame_slot
            .lock()
            .map_err(|_| EngineError::Capture("frame slot poisoned".into()))?;
        (*slot)
            .clone()
            .ok_or_else(|| EngineError::Capture("no frame has been presented yet".into()))
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.bounds = window_bounds(width, height);
        for entry in self.views.values() {
            if let Err(e) = entry.webview.set_bounds(self.bounds) {
                warn!(error = %e, "failed to resize webview");
            }
        }
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        match self.events.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

fn window_bounds(width: u32, height: u32) -> Rect {
    Rect {
        position: wry::dpi::Position::Physical(wry::dpi::PhysicalPosition::new(0, 0)),
        size: wry::dpi::Size::Physical(wry::dpi::PhysicalSize::new(width, height)),
    }
}
