//! Graceful shutdown signal wiring.
//!
//! Listens for SIGTERM/SIGINT on Unix (Ctrl+C on Windows) and cancels a
//! [`CancellationToken`] shared with the HTTP server.

use tokio_util::sync::CancellationToken;

/// Spawn the signal listener and return the token it will cancel.
///
/// # Errors
///
/// Returns an [`std::io::Error`] if signal registration fails.
pub fn shutdown_token() -> Result<CancellationToken, std::io::Error> {
    let token = CancellationToken::new();
    let trigger = token.clone();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => trigger.cancel(),
                _ = sigint.recv() => trigger.cancel(),
            }
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            trigger.cancel();
        });
    }

    Ok(token)
}
