//! Voice-state updates reduced to study-channel transitions.

use serde::{Deserialize, Serialize};

/// A voice-state update as delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateChange {
    pub member_id: String,
    /// Channel before the update, `None` when not connected.
    pub old_channel: Option<String>,
    /// Channel after the update, `None` when disconnected.
    pub new_channel: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Join,
    Leave,
}

impl VoiceStateChange {
    pub fn new(
        member_id: impl Into<String>,
        old_channel: Option<String>,
        new_channel: Option<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            old_channel,
            new_channel,
        }
    }

    /// Classify the update relative to the study channel.
    ///
    /// Updates that stay inside (mute, deafen, stream toggles) or never
    /// touch the study channel are not transitions.
    pub fn transition(&self, study_channel_id: &str) -> Option<Transition> {
        let was_in = self.old_channel.as_deref() == Some(study_channel_id);
        let is_in = self.new_channel.as_deref() == Some(study_channel_id);
        match (was_in, is_in) {
            (false, true) => Some(Transition::Join),
            (true, false) => Some(Transition::Leave),
            _ => None,
        }
    }
}
