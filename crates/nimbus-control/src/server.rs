//! The unix-socket accept loop.
//!
//! Trusted-peer transport: the socket file is chmod 0600 and access control
//! is entirely filesystem permissions. Each connection carries exactly one
//! request/response exchange and is then shut down.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use futures_util::FutureExt;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::context::ServerContext;
use crate::envelope::Envelope;
use crate::http::{self, FrameError};
use crate::router;

pub struct ControlServer {
    listener: UnixListener,
    path: PathBuf,
    ctx: ServerContext,
}

impl ControlServer {
    /// Bind the control socket at the configured path. A stale socket file
    /// from a previous run is removed; the fresh one is restricted to the
    /// owning user before the first accept.
    pub fn bind(ctx: ServerContext) -> io::Result<Self> {
        let path = ctx.config.socket_path.clone();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::remove_file(&path) {
            Ok(()) => warn!(path = %path.display(), "removed stale control socket"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let listener = UnixListener::bind(&path)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        info!(path = %path.display(), "control socket listening");
        Ok(Self { listener, path, ctx })
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    /// Accept connections until the listener errors. Each connection is
    /// served on its own task so a slow load wait never blocks accepts.
    pub async fn run(self) -> io::Result<()> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            let ctx = self.ctx.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(ctx, stream).await {
                    debug!(error = %e, "connection closed with error");
                }
            });
        }
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

async fn handle_connection(ctx: ServerContext, mut stream: UnixStream) -> io::Result<()> {
    let request = match http::read_request(&mut stream, ctx.config.max_request_bytes).await {
        Ok(request) => request,
        Err(FrameError::TooLarge) => {
            let body = Envelope::error("request exceeds maximum allowed size").into_value();
            return write_response(&mut stream, 413, &body.to_string()).await;
        }
        Err(FrameError::Malformed(message)) => {
            let body = Envelope::error(format!("malformed request: {message}")).into_value();
            return write_response(&mut stream, 400, &body.to_string()).await;
        }
        Err(FrameError::Io(e)) => return Err(e),
    };

    // A panicking handler must never take the whole server down; the
    // connection gets a 500 and the accept loop keeps going.
    let (status, body) = match AssertUnwindSafe(router::dispatch(&ctx, &request))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            error!(path = %request.path, "handler panicked");
            (500, Envelope::error("internal server error").into_value())
        }
    };

    write_response(&mut stream, status, &body.to_string()).await
}

async fn write_response(stream: &mut UnixStream, status: u16, body: &str) -> io::Result<()> {
    stream
        .write_all(http::format_response(status, body).as_bytes())
        .await?;
    stream.shutdown().await
}
