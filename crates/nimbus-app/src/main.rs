mod app;
mod cli;

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use nimbus_config::ControlConfig;
use nimbus_control::{ControlServer, ServerContext};
use nimbus_engine::ui_channel;

use app::{NimbusApp, UiWake};

fn main() {
    let args = cli::parse();

    // Initialize logging
    let log_directive = args.log_level.as_deref().unwrap_or("nimbus=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "nimbus=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("Nimbus v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(load_config(&args));
    tracing::info!(
        "Control socket: {}",
        config.socket_path.display()
    );

    // The marshaler: executor clones go to the I/O side, the runner stays
    // with the event loop thread.
    let (executor, runner) = ui_channel();

    // Control server on its own tokio runtime thread.
    let ctx = ServerContext::new(executor.clone(), Arc::clone(&config));
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to create tokio runtime");
        runtime.block_on(async move {
            match ControlServer::bind(ctx) {
                Ok(server) => {
                    if let Err(e) = server.run().await {
                        tracing::error!("control server stopped: {e}");
                    }
                }
                Err(e) => tracing::error!("failed to bind control socket: {e}"),
            }
        });
    });

    // Create event loop and run
    let event_loop = EventLoop::<UiWake>::with_user_event()
        .build()
        .expect("failed to create event loop");
    let proxy = event_loop.create_proxy();
    executor.set_waker(move || {
        let _ = proxy.send_event(UiWake);
    });

    let mut app = NimbusApp::new(runner, args.url.clone());

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {e}");
    }
    tracing::info!("Shutdown complete");
}

fn load_config(args: &cli::Args) -> ControlConfig {
    let loaded = match &args.config {
        Some(path) => {
            tracing::info!("Using config override: {path}");
            nimbus_config::load_config_from(Path::new(path))
        }
        None => nimbus_config::load_config(),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        ControlConfig::default()
    })
}
