use crate::emotion::EmotionLabel;
use serde::{Deserialize, Serialize};

const NOTE_LIMIT: usize = 50;

/// Mood score (1-10) recorded for a label. Takes a string because the
/// manual mood picker also offers "excited".
pub fn mood_score_for(emotion: &str) -> u8 {
    match emotion {
        "happy" => 8,
        "excited" => 9,
        "neutral" => 5,
        "sad" => 3,
        "stressed" => 3,
        "anxious" => 2,
        "angry" => 2,
        "lonely" => 2,
        "crisis" => 1,
        _ => 5,
    }
}

pub fn mood_score(emotion: EmotionLabel) -> u8 {
    mood_score_for(emotion.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood_score: u8,
    pub primary_emotion: EmotionLabel,
    pub notes: String,
    pub checkin_type: String,
}

impl MoodEntry {
    /// Mood record for a conversation turn, or `None` for neutral turns.
    pub fn from_turn(emotion: EmotionLabel, message: &str) -> Option<MoodEntry> {
        if emotion == EmotionLabel::Neutral {
            return None;
        }

        Some(MoodEntry {
            mood_score: mood_score(emotion),
            primary_emotion: emotion,
            notes: truncate_note(message),
            checkin_type: "conversation".to_string(),
        })
    }
}

/// First 50 characters, with "..." appended when anything was cut.
fn truncate_note(message: &str) -> String {
    if message.chars().count() > NOTE_LIMIT {
        let head: String = message.chars().take(NOTE_LIMIT).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}
