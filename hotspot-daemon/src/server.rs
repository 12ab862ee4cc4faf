//! HTTP/1 server for the dashboard API.

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::state::AppState;

/// Bind the API listener on `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}:{}: {}", host, port, e))?;
    Ok(listener)
}

/// Accept connections until `cancel` fires.
///
/// Open connections are aborted on shutdown; responses are small and
/// requests short-lived.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    cancel: CancellationToken,
) -> Result<()> {
    let local: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(addr = ?local, "dashboard API listening");

    let server = http1::Builder::new();
    let mut connections = JoinSet::new();

    loop {
        let stream = tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::ConnectionAborted
                            | io::ErrorKind::ConnectionReset
                            | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    connections.shutdown().await;
                    return Err(e.into());
                }
                Ok((stream, _)) => stream,
            },
            finished = async {
                match connections.join_next().await {
                    Some(finished) => finished,
                    None => std::future::pending().await,
                }
            } => {
                if let Err(e) = finished {
                    if e.is_panic() {
                        tracing::error!(error = ?e, "connection handler panicked");
                    }
                }
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let server = server.clone();
        let state = Arc::clone(&state);
        connections.spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { Ok::<_, Infallible>(api::handle(state, req).await) }
            });
            if let Err(e) = server.serve_connection(io, service).await {
                tracing::debug!(error = %e, "connection error");
            }
        });
    }

    connections.shutdown().await;
    tracing::info!("dashboard API stopped");
    Ok(())
}
