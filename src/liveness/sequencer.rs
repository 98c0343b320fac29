//! Challenge sequencer for liveness verification
//!
//! A pure, synchronous state machine fed one camera frame at a time. Each
//! challenge is confirmed by debounced multi-frame validation, and a final
//! consistency check over the retained metrics history gates the overall
//! verdict. A spoofed static image can satisfy an instantaneous pose
//! threshold; requiring consecutive qualifying frames plus plausible
//! session-wide distance variation raises the bar without a heavier model.

use crate::models::{FaceMetrics, LivenessChallenge, LivenessState};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Fixed challenge order; not configurable by the caller.
const CHALLENGE_SEQUENCE: [LivenessChallenge; 2] =
    [LivenessChallenge::TurnLeft, LivenessChallenge::TurnRight];

/// Yaw magnitude (degrees) that satisfies a turn challenge.
const CHALLENGE_YAW_THRESHOLD_DEGREES: f32 = 15.0;

/// Qualifying frames needed to confirm a challenge.
const REQUIRED_QUALIFYING_FRAMES: u32 = 2;

/// Non-qualifying frames tolerated before partial progress is discarded.
const MISS_TOLERANCE_FRAMES: u32 = 2;

/// Rolling metrics history, oldest evicted first.
const METRICS_HISTORY_CAPACITY: usize = 10;

/// Minimum retained samples for the consistency check to accept a session.
const CONSISTENCY_MIN_SAMPLES: usize = 5;

/// Acceptance window for the mean absolute deviation of face distance.
const CONSISTENCY_DEVIATION_MIN: f32 = 0.03;
const CONSISTENCY_DEVIATION_MAX: f32 = 0.3;

const INCONSISTENT_METRICS_REASON: &str = "Verification failed - inconsistent face metrics";

/// Liveness challenge state machine. One instance per verification session;
/// the owner serializes calls and controls the lifetime explicitly.
pub struct ChallengeSequencer {
    state: LivenessState,
    history: VecDeque<FaceMetrics>,
    success_streak: u32,
    miss_buffer: u32,
    generation: u64,
}

impl ChallengeSequencer {
    pub fn new() -> Self {
        Self {
            state: LivenessState::Initializing,
            history: VecDeque::with_capacity(METRICS_HISTORY_CAPACITY),
            success_streak: 0,
            miss_buffer: 0,
            generation: 0,
        }
    }

    pub fn state(&self) -> &LivenessState {
        &self.state
    }

    /// Arm a fresh session. Returns the generation a delayed activation must
    /// present; any later `begin`/`reset` invalidates it.
    pub fn begin(&mut self) -> u64 {
        self.clear();
        self.state = LivenessState::Initializing;
        self.generation += 1;
        self.generation
    }

    /// Fired after the camera-settle delay. A stale generation means the
    /// session was reset or restarted in the meantime; the activation is
    /// dropped so it cannot clobber the newer session.
    pub fn activate(&mut self, generation: u64) -> bool {
        if generation != self.generation || !matches!(self.state, LivenessState::Initializing) {
            return false;
        }

        self.state = LivenessState::ChallengeInProgress {
            index: 0,
            challenges: CHALLENGE_SEQUENCE.to_vec(),
        };
        debug!(challenge = ?CHALLENGE_SEQUENCE[0], "Liveness challenges active");
        true
    }

    /// Force the session back to `Initializing`, discarding all progress.
    pub fn reset(&mut self) {
        self.clear();
        self.state = LivenessState::Initializing;
        self.generation += 1;
    }

    fn clear(&mut self) {
        self.history.clear();
        self.success_streak = 0;
        self.miss_buffer = 0;
    }

    /// Advance the state machine by one analyzed camera frame.
    pub fn process_frame(&mut self, metrics: FaceMetrics) {
        if !metrics.face_detected {
            // A dropped face stalls the current challenge without failing it.
            self.success_streak = 0;
            self.miss_buffer = 0;
            return;
        }

        self.push_history(metrics);

        let (index, challenges) = match &self.state {
            LivenessState::ChallengeInProgress { index, challenges } => {
                (*index, challenges.clone())
            }
            // Idle or terminal; frames are ignored.
            _ => return,
        };

        if challenge_satisfied(challenges[index], &metrics) {
            self.success_streak += 1;
            self.miss_buffer = 0;

            if self.success_streak >= REQUIRED_QUALIFYING_FRAMES {
                self.advance(index, challenges);
            }
        } else {
            self.miss_buffer += 1;

            // Brief pose jitter is tolerated; sustained misses discard the
            // partial streak but never move the challenge pointer.
            if self.miss_buffer > MISS_TOLERANCE_FRAMES {
                self.success_streak = 0;
                self.miss_buffer = 0;
            }
        }
    }

    fn advance(&mut self, index: usize, challenges: Vec<LivenessChallenge>) {
        self.success_streak = 0;
        self.miss_buffer = 0;

        let next = index + 1;
        if next < challenges.len() {
            debug!(
                completed = ?challenges[index],
                next = ?challenges[next],
                "Challenge complete"
            );
            self.state = LivenessState::ChallengeInProgress {
                index: next,
                challenges,
            };
        } else if self.history_is_consistent() {
            info!("Liveness verification succeeded");
            self.state = LivenessState::Success;
        } else {
            warn!(
                samples = self.history.len(),
                "Liveness verification rejected by consistency check"
            );
            self.state = LivenessState::Failed {
                reason: INCONSISTENT_METRICS_REASON.to_string(),
            };
        }
    }

    fn push_history(&mut self, metrics: FaceMetrics) {
        if self.history.len() == METRICS_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(metrics);
    }

    /// Mean absolute deviation of face distance across the retained frames.
    /// Near-zero deviation looks like a replayed static image; wild swings
    /// look like a spliced feed. Fewer than the minimum samples is treated
    /// as insufficient evidence and rejected.
    fn history_is_consistent(&self) -> bool {
        if self.history.len() < CONSISTENCY_MIN_SAMPLES {
            return false;
        }

        let count = self.history.len() as f32;
        let mean = self.history.iter().map(|m| m.face_distance).sum::<f32>() / count;
        let deviation = self
            .history
            .iter()
            .map(|m| (m.face_distance - mean).abs())
            .sum::<f32>()
            / count;

        (CONSISTENCY_DEVIATION_MIN..=CONSISTENCY_DEVIATION_MAX).contains(&deviation)
    }
}

impl Default for ChallengeSequencer {
    fn default() -> Self {
        Self::new()
    }
}

fn challenge_satisfied(challenge: LivenessChallenge, metrics: &FaceMetrics) -> bool {
    match challenge {
        LivenessChallenge::TurnLeft => metrics.head_yaw_angle < -CHALLENGE_YAW_THRESHOLD_DEGREES,
        LivenessChallenge::TurnRight => metrics.head_yaw_angle > CHALLENGE_YAW_THRESHOLD_DEGREES,
    }
}
