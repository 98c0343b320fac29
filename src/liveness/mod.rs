//! Liveness detection session
//!
//! Wraps the pure challenge sequencer with the ownership and scheduling it
//! needs inside a live camera pipeline: serialized frame delivery, a watch
//! channel for state observers, and a cancellable activation delay that lets
//! the camera preview settle before the first challenge is shown.

pub mod sequencer;
pub use sequencer::ChallengeSequencer;

use crate::models::{FaceMetrics, LivenessChallenge, LivenessState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Camera-settle delay between `start` and the first active challenge.
const ACTIVATION_DELAY: Duration = Duration::from_secs(1);

/// One verification session. Callers own the instance lifetime and restart
/// it explicitly with `start`/`reset`; nothing here is process-global.
pub struct LivenessSession {
    sequencer: Arc<Mutex<ChallengeSequencer>>,
    state_tx: watch::Sender<LivenessState>,
    pending_activation: Mutex<Option<JoinHandle<()>>>,
}

impl LivenessSession {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(LivenessState::Initializing);

        Self {
            sequencer: Arc::new(Mutex::new(ChallengeSequencer::new())),
            state_tx,
            pending_activation: Mutex::new(None),
        }
    }

    /// Observer handle for UI rendering. Carries at most one current value,
    /// updated synchronously within `start`/`process_frame`/`reset`.
    pub fn subscribe(&self) -> watch::Receiver<LivenessState> {
        self.state_tx.subscribe()
    }

    pub async fn current_state(&self) -> LivenessState {
        self.sequencer.lock().await.state().clone()
    }

    /// Challenge the subject must currently perform, if any.
    pub async fn current_challenge(&self) -> Option<LivenessChallenge> {
        self.sequencer.lock().await.state().active_challenge()
    }

    /// Arm a fresh session. The first challenge becomes active after the
    /// settle delay unless `reset` or another `start` lands first.
    pub async fn start(&self) {
        let generation = {
            let mut seq = self.sequencer.lock().await;
            let generation = seq.begin();
            self.state_tx.send_replace(seq.state().clone());
            generation
        };

        info!(generation, "Liveness session started");

        let sequencer = Arc::clone(&self.sequencer);
        let state_tx = self.state_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ACTIVATION_DELAY).await;

            let mut seq = sequencer.lock().await;
            // begin/reset in the meantime bumped the generation; the
            // sequencer drops a stale activation.
            if seq.activate(generation) {
                debug!(generation, "First challenge active");
                state_tx.send_replace(seq.state().clone());
            }
        });

        let mut pending = self.pending_activation.lock().await;
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Feed one analyzed camera frame and return the resulting state.
    ///
    /// Frames must arrive from a single pipeline thread in camera order; the
    /// session mutex guarantees no two frames interleave even if that
    /// contract is violated upstream.
    pub async fn process_frame(&self, metrics: FaceMetrics) -> LivenessState {
        let mut seq = self.sequencer.lock().await;
        seq.process_frame(metrics);
        let state = seq.state().clone();

        self.state_tx.send_if_modified(|current| {
            if *current != state {
                *current = state.clone();
                true
            } else {
                false
            }
        });

        state
    }

    /// Abort any pending activation and return to `Initializing`.
    pub async fn reset(&self) {
        if let Some(handle) = self.pending_activation.lock().await.take() {
            handle.abort();
        }

        let mut seq = self.sequencer.lock().await;
        seq.reset();
        self.state_tx.send_replace(seq.state().clone());
        info!("Liveness session reset");
    }
}

impl Default for LivenessSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(yaw: f32, distance: f32) -> FaceMetrics {
        FaceMetrics {
            face_detected: true,
            head_yaw_angle: yaw,
            face_distance: distance,
        }
    }

    async fn settled(session: &LivenessSession) {
        session.start().await;
        tokio::time::sleep(ACTIVATION_DELAY + Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_challenge_active_after_delay() {
        let session = LivenessSession::new();

        session.start().await;
        assert_eq!(session.current_state().await, LivenessState::Initializing);
        assert_eq!(session.current_challenge().await, None);

        tokio::time::sleep(ACTIVATION_DELAY + Duration::from_millis(50)).await;
        assert_eq!(
            session.current_challenge().await,
            Some(LivenessChallenge::TurnLeft)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_activation() {
        let session = LivenessSession::new();

        session.start().await;
        session.reset().await;

        tokio::time::sleep(ACTIVATION_DELAY * 2).await;
        assert_eq!(session.current_state().await, LivenessState::Initializing);
        assert_eq!(session.current_challenge().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_previous_session() {
        let session = LivenessSession::new();

        session.start().await;
        // Restart halfway through the settle delay; only the second
        // activation may fire.
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.start().await;

        tokio::time::sleep(ACTIVATION_DELAY + Duration::from_millis(50)).await;
        assert_eq!(
            session.current_challenge().await,
            Some(LivenessChallenge::TurnLeft)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_session_reaches_success() {
        let session = LivenessSession::new();
        settled(&session).await;

        session.process_frame(frame(-20.0, 0.40)).await;
        session.process_frame(frame(-20.0, 0.50)).await;
        session.process_frame(frame(0.0, 0.60)).await;
        session.process_frame(frame(20.0, 0.45)).await;
        let state = session.process_frame(frame(20.0, 0.55)).await;

        assert_eq!(state, LivenessState::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_state_changes() {
        let session = LivenessSession::new();
        let rx = session.subscribe();
        settled(&session).await;

        session.process_frame(frame(-20.0, 0.40)).await;
        session.process_frame(frame(-20.0, 0.50)).await;

        match &*rx.borrow() {
            LivenessState::ChallengeInProgress { index, .. } => assert_eq!(*index, 1),
            other => panic!("unexpected state: {:?}", other),
        };
    }
}
