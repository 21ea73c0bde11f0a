//! Graceful shutdown trigger.

use std::future::Future;
use std::io;
use tracing::{error, info};

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
///
/// A signal whose handler cannot be installed never fires; the other one
/// still does.
pub async fn shutdown_signal() {
    let ctrl_c = listen("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = listen("SIGTERM", async {
        use tokio::signal::unix::{signal, SignalKind};

        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown requested");
}

/// Waits for `signal`. If listening fails, logs and waits forever.
async fn listen<F>(name: &'static str, signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        error!(error = %err, signal = name, "cannot listen for signal");
        std::future::pending::<()>().await;
    }
}
