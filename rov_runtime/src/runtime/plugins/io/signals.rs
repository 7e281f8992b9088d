// rov_runtime/src/runtime/plugins/io/signals.rs

use bevy::prelude::*;
use std::future::Future;
use std::time::Duration;

use crate::runtime::core::shared::SharedIo;

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM. If a handler cannot be
/// installed, that source never resolves.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// Resolves once anything has asked the loop to shut down.
pub async fn shutdown_requested(io: &SharedIo) {
    while !io.shutdown_requested() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Turns `signal` into the same shutdown request the `stop` command raises, so the
/// loop finishes its tick and commands neutral before exiting. Returns early if the
/// loop is already shutting down for another reason.
pub async fn forward_shutdown<F>(signal: F, io: SharedIo)
where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = signal => io.request_shutdown(),
        _ = shutdown_requested(&io) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_raises_the_shutdown_request() {
        let io = SharedIo::default();
        forward_shutdown(async {}, io.clone()).await;
        assert!(io.shutdown_requested());
    }

    #[tokio::test]
    async fn forwarding_ends_when_shutdown_comes_from_elsewhere() {
        let io = SharedIo::default();
        io.request_shutdown();
        tokio::time::timeout(
            Duration::from_secs(2),
            forward_shutdown(std::future::pending(), io.clone()),
        )
        .await
        .unwrap();
    }
}
