//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on the first Ctrl-C.
///
/// In-flight operations still finish; the scheduler stops before the next
/// batch and returns partial results.
pub fn install_interrupt_handler(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        log::warn!("Interrupt received, finishing the current batch");
                        cancel.cancel();
                    }
                    Err(e) => log::warn!("Failed to listen for Ctrl-C: {}", e),
                }
            }
            _ = cancel.cancelled() => {}
        }
    })
}

/// Stops the interrupt handler once the run is over.
pub async fn shutdown_gracefully(interrupt_handler: JoinHandle<()>) {
    interrupt_handler.abort();
    let _ = interrupt_handler.await;
}
