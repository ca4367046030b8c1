//! Repetition notifications emitted by the stage machine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepEvent {
    /// Session the repetition belongs to
    pub session_id: Uuid,
    /// Running repetition number within the session (1-based)
    pub repetition: u32,
    /// Joint angle of the frame that completed the repetition
    pub angle: f64,
    /// Emission timestamp (ms since UNIX epoch)
    pub timestamp: u64,
}

impl RepEvent {
    pub fn new(session_id: Uuid, repetition: u32, angle: f64) -> Self {
        RepEvent {
            session_id,
            repetition,
            angle,
            timestamp: crate::now_millis(),
        }
    }

    /// Spoken confirmation for this repetition
    pub fn announcement(&self) -> String {
        format!("Good! Repetition {}", self.repetition)
    }
}
