// ConsoleWatch - app/poller.rs
//
// Live console polling: repeatedly requests the chunk starting at the current
// cursor, applies it, and waits for the delay the update step picked.
//
// Architecture:
//   - `ConsolePoller::schedule_fetch` is one async loop on a tokio runtime.
//     Each cycle awaits the previous one, so exactly one request is ever in
//     flight and chunks are applied in request order.
//   - A `CancellationToken` stops the loop at either suspension point (the
//     delay or the in-flight request).
//   - The display state and viewport live in a shared `ConsoleView` so the
//     GUI can render them; the lock is held only while a chunk is applied.
//   - `PollManager` lives on the UI thread and exposes start/stop/poll like
//     the other background managers. Progress arrives over an mpsc channel.
//
// Failure handling:
//   - Every transport failure is retried after `PollTimings::retry`, without
//     a retry limit, and with the `repeat` flag preserved. A one-shot poll
//     therefore keeps retrying until it gets one answer.
//   - If the progress receiver is dropped the loop exits silently.

use crate::app::transport::ConsoleTransport;
use crate::core::model::{DisplayState, PollProgress, PollTimings};
use crate::core::surface::Viewport;
use crate::core::update::apply_update;
use crate::util::constants::MAX_POLL_MESSAGES_PER_FRAME;
use crate::util::error::ConsoleWatchError;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Shared view
// =============================================================================

/// Everything the update step mutates: stream state plus scroll metrics.
#[derive(Debug, Default)]
pub struct ConsoleView {
    pub state: DisplayState,
    pub viewport: Viewport,
}

impl ConsoleView {
    pub fn new(state: DisplayState, viewport: Viewport) -> Self {
        Self { state, viewport }
    }
}

/// Console view shared between the poll task and the renderer.
pub type SharedView = Arc<Mutex<ConsoleView>>;

/// Lock the shared view. A panic elsewhere while holding the lock cannot
/// leave `ConsoleView` half-updated in a way that matters for display, so a
/// poisoned lock is recovered rather than propagated.
pub fn lock_view(view: &SharedView) -> MutexGuard<'_, ConsoleView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// ConsolePoller
// =============================================================================

/// One poll loop bound to a transport and a view.
pub struct ConsolePoller<T> {
    transport: T,
    view: SharedView,
    timings: PollTimings,
    progress: mpsc::Sender<PollProgress>,
}

impl<T: ConsoleTransport> ConsolePoller<T> {
    pub fn new(
        transport: T,
        view: SharedView,
        timings: PollTimings,
        progress: mpsc::Sender<PollProgress>,
    ) -> Self {
        Self {
            transport,
            view,
            timings,
            progress,
        }
    }

    /// Run the poll loop: wait `delay`, fetch, apply, repeat.
    ///
    /// With `repeat == false` the loop ends after the first successful fetch
    /// (failures are retried first). Sends `PollProgress::Stopped` on exit.
    pub async fn schedule_fetch(self, delay: Duration, repeat: bool, cancel: CancellationToken) {
        let Self {
            transport,
            view,
            timings,
            progress,
        } = self;

        macro_rules! send {
            ($msg:expr) => {
                if progress.send($msg).is_err() {
                    tracing::debug!("Poll progress receiver closed; exiting poll loop");
                    return;
                }
            };
        }

        let url = transport.endpoint().to_string();
        send!(PollProgress::Started { url: url.clone() });
        tracing::info!(url = %url, repeat, "Console polling started");

        let mut delay = delay;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let cursor = lock_view(&view).state.cursor();
            tracing::trace!(cursor, "Requesting console chunk");

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                r = transport.fetch(cursor) => r,
            };

            match result {
                Ok(response) => {
                    let outcome = {
                        let mut guard = lock_view(&view);
                        let view = &mut *guard;
                        apply_update(
                            &mut view.state,
                            &mut view.viewport,
                            response.as_ref(),
                            &timings,
                        )
                    };

                    match outcome.applied {
                        Some(chunk) => send!(PollProgress::Applied {
                            text: chunk.text,
                            gap: chunk.gap,
                            cursor: chunk.cursor,
                        }),
                        None => send!(PollProgress::NoData),
                    }

                    if !repeat {
                        tracing::debug!("One-shot poll complete");
                        break;
                    }
                    delay = outcome.next_delay;
                }
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        error = %e,
                        retry_ms = timings.retry.as_millis() as u64,
                        "Console fetch failed; retrying"
                    );
                    send!(PollProgress::TransportFailed {
                        message: e.to_string(),
                        retry_in: timings.retry,
                    });
                    delay = timings.retry;
                }
            }
        }

        tracing::info!(url = %url, "Console polling stopped");
        let _ = progress.send(PollProgress::Stopped);
    }
}

// =============================================================================
// PollManager
// =============================================================================

/// Owns the tokio runtime and the currently running poll loop.
pub struct PollManager {
    runtime: tokio::runtime::Runtime,
    /// Channel receiver for progress messages.
    pub progress_rx: Option<mpsc::Receiver<PollProgress>>,
    /// Cancel token shared with the running poll loop.
    cancel: Option<CancellationToken>,
}

impl PollManager {
    pub fn new() -> Result<Self, ConsoleWatchError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("console-poll")
            .enable_all()
            .build()
            .map_err(|e| ConsoleWatchError::Io {
                operation: "starting async runtime",
                source: e,
            })?;

        Ok(Self {
            runtime,
            progress_rx: None,
            cancel: None,
        })
    }

    /// Start polling with `transport`, writing into `view`.
    ///
    /// If a poll loop is already running it is stopped first.
    pub fn start<T>(&mut self, transport: T, view: SharedView, timings: PollTimings, repeat: bool)
    where
        T: ConsoleTransport + 'static,
    {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();

        self.progress_rx = Some(rx);
        self.cancel = Some(cancel.clone());

        let poller = ConsolePoller::new(transport, view, timings, tx);
        self.runtime.spawn(poller.schedule_fetch(
            Duration::from_millis(crate::util::constants::INITIAL_POLL_DELAY_MS),
            repeat,
            cancel,
        ));
    }

    /// Request the running poll loop to stop.
    pub fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.progress_rx = None;
    }

    /// Returns `true` while a poll loop has been started and not stopped.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Drain queued progress messages without blocking, up to the per-frame cap.
    pub fn poll_progress(&self) -> Vec<PollProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < MAX_POLL_MESSAGES_PER_FRAME {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        messages
    }

    /// Block until the next progress message. `None` once the loop is gone.
    pub fn recv_progress(&self) -> Option<PollProgress> {
        self.progress_rx.as_ref().and_then(|rx| rx.recv().ok())
    }

    /// Cancel the running poll loop when the process receives Ctrl-C.
    pub fn stop_on_ctrl_c(&self) {
        let Some(token) = self.cancel.clone() else {
            return;
        };
        self.runtime.spawn(async move {
            tokio::select! {
                r = tokio::signal::ctrl_c() => {
                    if r.is_ok() {
                        tracing::info!("Ctrl-C received; stopping");
                        token.cancel();
                    }
                }
                _ = token.cancelled() => {}
            }
        });
    }
}

impl Drop for PollManager {
    fn drop(&mut self) {
        self.stop();
    }
}
