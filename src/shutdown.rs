use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

pub type ShutdownSender = watch::Sender<bool>;
pub type ShutdownReceiver = watch::Receiver<bool>;

/// Shutdown flag shared by every task of a run. Once raised it stays raised,
/// so receivers subscribed after the signal still observe it.
#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Raise the shutdown flag.
pub fn request_shutdown(shutdown_tx: &ShutdownSender) {
    let _was_requested = shutdown_tx.send_replace(true);
}

#[must_use]
pub fn shutdown_requested(shutdown_rx: &ShutdownReceiver) -> bool {
    *shutdown_rx.borrow()
}

/// Resolve once shutdown has been signalled, immediately if it already was.
/// A closed channel never signals.
pub async fn wait_for_shutdown(shutdown_rx: &mut ShutdownReceiver) {
    let signalled = shutdown_rx.wait_for(|requested| *requested).await.is_ok();
    if !signalled {
        std::future::pending::<()>().await;
    }
}

/// Forward Ctrl-C (and SIGTERM on unix) into the shutdown channel.
pub fn setup_signal_shutdown_handler(
    shutdown_tx: &ShutdownSender,
) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted; shutting down.");
                    request_shutdown(&shutdown_tx);
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("Terminated; shutting down.");
                    request_shutdown(&shutdown_tx);
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted; shutting down.");
                    request_shutdown(&shutdown_tx);
                }
            }
        }
    })
}

/// Signal shutdown once `deadline` has elapsed, unless the run ends first.
pub fn setup_deadline_handler(
    shutdown_tx: &ShutdownSender,
    deadline: Duration,
) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            () = wait_for_shutdown(&mut shutdown_rx) => {}
            () = tokio::time::sleep(deadline) => {
                info!("Deadline of {:?} reached; stopping workers.", deadline);
                request_shutdown(&shutdown_tx);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_handler_signals_shutdown() -> Result<(), String> {
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let handle = setup_deadline_handler(&shutdown_tx, Duration::from_secs(30));

        tokio::time::timeout(Duration::from_secs(31), wait_for_shutdown(&mut shutdown_rx))
            .await
            .map_err(|err| format!("Timed out waiting for deadline: {}", err))?;
        handle
            .await
            .map_err(|err| format!("Deadline task join error: {}", err))?;
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_handler_exits_on_earlier_shutdown() -> Result<(), String> {
        let (shutdown_tx, _shutdown_rx) = shutdown_channel();
        let handle = setup_deadline_handler(&shutdown_tx, Duration::from_secs(3_600));

        request_shutdown(&shutdown_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .map_err(|err| format!("Timed out waiting for deadline task: {}", err))?
            .map_err(|err| format!("Deadline task join error: {}", err))?;
        Ok(())
    }

    #[tokio::test]
    async fn late_subscriber_sees_earlier_shutdown() -> Result<(), String> {
        let (shutdown_tx, _shutdown_rx) = shutdown_channel();
        request_shutdown(&shutdown_tx);

        let mut late_rx = shutdown_tx.subscribe();
        if !shutdown_requested(&late_rx) {
            return Err("Late subscriber missed the shutdown flag".to_owned());
        }
        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(&mut late_rx))
            .await
            .map_err(|err| format!("Late subscriber kept waiting: {}", err))?;
        Ok(())
    }

    #[tokio::test]
    async fn signal_handler_exits_on_shutdown() -> Result<(), String> {
        let (shutdown_tx, _shutdown_rx) = shutdown_channel();
        let handle = setup_signal_shutdown_handler(&shutdown_tx);

        request_shutdown(&shutdown_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .map_err(|err| format!("Timed out waiting for shutdown handler: {}", err))?
            .map_err(|err| format!("Shutdown task join error: {}", err))?;
        Ok(())
    }
}
