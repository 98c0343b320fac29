//! Core data models for the banking support service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Audio,
    Photo,
    Video,
}

//
// ================= Liveness =================
//

/// Per-frame face measurements produced by the camera analysis pipeline.
/// Ephemeral; carries no identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceMetrics {
    pub face_detected: bool,
    /// Head yaw in degrees; negative is a left turn.
    pub head_yaw_angle: f32,
    /// Normalized face-to-camera distance.
    pub face_distance: f32,
}

/// A single required head-pose action. Sequence order is fixed and significant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LivenessChallenge {
    TurnLeft,
    TurnRight,
}

/// Session state of a liveness verification run.
///
/// `Success` and `Failed` are terminal until the session is started or reset
/// again. `index` always points inside `challenges`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LivenessState {
    Initializing,
    ChallengeInProgress {
        index: usize,
        challenges: Vec<LivenessChallenge>,
    },
    Success,
    Failed { reason: String },
}

impl LivenessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LivenessState::Success | LivenessState::Failed { .. })
    }

    /// Challenge the subject must currently perform, if a session is active.
    pub fn active_challenge(&self) -> Option<LivenessChallenge> {
        match self {
            LivenessState::ChallengeInProgress { index, challenges } => {
                challenges.get(*index).copied()
            }
            _ => None,
        }
    }
}

//
// ================= Tickets =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: Uuid,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: Uuid,
    pub customer_id: Uuid,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    pub attachments: Vec<Attachment>,
    pub urgency: UrgencyLevel,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller supplies when filing a ticket. Id, urgency, status and
/// timestamps are stamped by the desk at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    pub customer_id: Uuid,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

//
// ================= UrgencyLevel Ordering =================
//

impl PartialOrd for UrgencyLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UrgencyLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl UrgencyLevel {
    fn rank(&self) -> u8 {
        match self {
            UrgencyLevel::Low => 0,
            UrgencyLevel::Medium => 1,
            UrgencyLevel::High => 2,
            UrgencyLevel::Critical => 3,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::High => "High",
            UrgencyLevel::Critical => "Critical",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}
