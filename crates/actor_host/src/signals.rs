//! Signal handling for graceful shutdown.
//!
//! SIGINT and SIGTERM on Unix, Ctrl+C on Windows.

use tokio::signal;
use tracing::info;

/// Waits for the first termination signal and logs it.
pub async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    wait_for_shutdown_signal_silent().await?;
    info!("📡 Received shutdown signal - initiating graceful shutdown");
    Ok(())
}

/// Same as [`wait_for_shutdown_signal`] without logging. Used for the
/// "second signal forces exit" handler.
pub async fn wait_for_shutdown_signal_silent() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    Ok(())
}
