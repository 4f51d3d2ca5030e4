//! HTTP surface: the query endpoint, static assets and a liveness probe.

pub mod assets;
pub mod dispatcher;
pub mod error;

use crate::app::App;
use axum::routing::{any, get};
use axum::Router;
use std::future::{Future, IntoFuture};
use std::io;
use std::pin::pin;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub fn router(app: App) -> Router {
    let assets = format!("{}{{*asset}}", app.config().strip_path);
    Router::new()
        .route("/healthz", get(|| async { "alive" }))
        .route("/query", any(dispatcher::query))
        .route(&assets, get(assets::fetch))
        .with_state(app)
}

/// Serves until `shutdown` resolves, then drains for at most [`SHUTDOWN_GRACE`].
pub async fn serve<F>(listener: TcpListener, app: App, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    if let Ok(address) = listener.local_addr() {
        log::info!("Listening on {address}");
    }

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router(app)).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server = pin!(server.into_future());

    tokio::select! {
        result = &mut server => return result,
        () = shutdown => {}
    }

    log::info!("Shutting down, draining in-flight requests");
    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("In-flight requests did not finish within {SHUTDOWN_GRACE:?}, closing");
            Ok(())
        }
    }
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(why) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c - {why}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(why) => {
                log::error!("Failed to listen for SIGTERM - {why}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
