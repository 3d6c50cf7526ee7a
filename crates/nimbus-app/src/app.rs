//! Top-level application state.
//!
//! Implements `winit::application::ApplicationHandler` to drive the main
//! event loop. The event loop thread IS the ui context: it owns the engine
//! and drains the marshaled work queue whenever the control server's waker
//! fires.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use nimbus_engine::{Engine, UiRunner};
use nimbus_webview::WryBackend;
use tracing::{error, info};

/// Wake-up signal sent through the event loop proxy after a submit.
#[derive(Debug)]
pub struct UiWake;

pub struct NimbusApp {
    runner: UiRunner,
    start_url: Option<String>,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
}

impl NimbusApp {
    pub fn new(runner: UiRunner, start_url: Option<String>) -> Self {
        Self {
            runner,
            start_url,
            window: None,
            engine: None,
        }
    }

    fn drain(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            self.runner.drain(engine);
        }
    }
}

impl ApplicationHandler<UiWake> for NimbusApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("Nimbus")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let backend = WryBackend::new(Arc::clone(&window), size.width, size.height);
        let mut engine = Engine::new(Box::new(backend));

        if let Some(url) = self.start_url.take() {
            match engine.create_tab(&url) {
                Ok(index) => info!(index, url, "opened startup tab"),
                Err(e) => error!(url, error = %e, "failed to open startup tab"),
            }
        }

        self.window = Some(window);
        self.engine = Some(engine);

        // Work may have queued up while the window was being created.
        self.drain();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: UiWake) {
        self.drain();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(size.width, size.height);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.drain();
    }
}
