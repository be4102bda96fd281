//! Bookkeeping for the single in-flight reasoning run of a pipeline stage.
//!
//! Every run gets a generation number and its own cancellation token. A run
//! may publish its result only while its generation is still current, and the
//! check happens under the same lock `abort` takes, so a late response can
//! never overwrite state published after a cancel or a newer start.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl InFlight {
    /// Supersede any running call and open a new generation.
    pub(crate) fn begin(&mut self) -> (u64, CancellationToken) {
        if self.abort() {
            tracing::debug!(generation = self.generation, "Superseding in-flight run");
        }
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        (self.generation, token)
    }

    /// Record the spawned task, unless the run already finished or was superseded.
    pub(crate) fn attach(&mut self, generation: u64, handle: JoinHandle<()>) {
        if self.is_running(generation) {
            self.handle = Some(handle);
        }
    }

    /// Cancel and abort the current run, if any. Returns whether one was running.
    /// Always invalidates the current generation.
    pub(crate) fn abort(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        let was_running = self.token.is_some();
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        was_running
    }

    /// Close `generation` if it is still the live run. A `false` return means
    /// the caller holds a stale result and must drop it.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        if !self.is_running(generation) {
            return false;
        }
        self.token = None;
        self.handle = None;
        true
    }

    pub(crate) fn is_running(&self, generation: u64) -> bool {
        self.generation == generation && self.token.is_some()
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.token.is_none()
    }
}
