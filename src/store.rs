use crate::dispatcher::ResponseCategory;
use crate::emotion::EmotionLabel;
use crate::error::StoreError;
use crate::insights::MoodInsights;
use crate::mood::MoodEntry;
use crate::profile::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A turn about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTurn {
    pub session_id: String,
    pub user_message: String,
    pub companion_response: String,
    pub detected_emotion: EmotionLabel,
    pub category: ResponseCategory,
}

/// A turn read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurn {
    pub id: String,
    pub session_id: String,
    pub user_message: String,
    pub companion_response: String,
    pub detected_emotion: EmotionLabel,
    pub category: ResponseCategory,
    pub created_at: String,
}

/// Storage collaborator for conversations, mood entries and the profile.
///
/// The engine never touches this; `ChatSession` does.
pub trait PersistenceStore: Send {
    fn record_turn(&self, turn: &NewTurn) -> Result<StoredTurn, StoreError>;

    fn record_mood(&self, entry: &MoodEntry) -> Result<(), StoreError>;

    /// Most recent turns across all sessions, oldest first.
    fn recent_turns(&self, limit: usize) -> Result<Vec<StoredTurn>, StoreError>;

    fn load_profile(&self) -> Result<Option<UserProfile>, StoreError>;

    fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Weekly mood averages, conversation counts and top emotions as of `now`.
    fn mood_insights(&self, now: DateTime<Utc>) -> Result<MoodInsights, StoreError>;
}
