use crate::dispatcher::ResponseCategory;
use crate::emotion::EmotionLabel;
use crate::engine::{ConversationTurn, EngineResult, ResponseEngine, Speaker};
use crate::error::StoreError;
use crate::insights::MoodInsights;
use crate::logging;
use crate::mood::MoodEntry;
use crate::profile::UserProfile;
use crate::prompts;
use crate::store::{NewTurn, PersistenceStore, StoredTurn};
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// How many past turns are loaded when a chat opens.
pub const HISTORY_LIMIT: usize = 20;

/// A message as shown in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub category: ResponseCategory,
    pub emotion: EmotionLabel,
}

/// One conversation with Emma: an engine plus where its turns get written.
pub struct ChatSession<S: PersistenceStore> {
    id: String,
    engine: ResponseEngine,
    store: S,
    profile: UserProfile,
    history: Vec<ConversationTurn>,
}

impl<S: PersistenceStore> ChatSession<S> {
    pub fn start(engine: ResponseEngine, store: S, profile: UserProfile) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        logging::log_conversation(Some(&id), "session started");
        Self {
            id,
            engine,
            store,
            profile,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store a new profile and use it from the next message on.
    pub fn update_profile(&mut self, profile: UserProfile) -> Result<(), StoreError> {
        self.store.save_profile(&profile)?;
        let resolved = profile.resolve();
        logging::log_memory(
            Some(&self.id),
            &format!(
                "profile updated nickname={} age_group={}",
                resolved.nickname,
                resolved.age_group.as_str()
            ),
        );
        self.profile = profile;
        Ok(())
    }

    pub fn mood_insights(&self) -> Result<MoodInsights, StoreError> {
        self.store.mood_insights(Utc::now())
    }

    /// Transcript to show when the chat opens: the last stored turns, or a
    /// welcome message for a first conversation.
    pub fn opening_messages(&mut self) -> Vec<ConversationTurn> {
        let stored = match self.store.recent_turns(HISTORY_LIMIT) {
            Ok(turns) => turns,
            Err(e) => {
                logging::log_error(
                    Some(&self.id),
                    &format!("failed to load history: {}", e),
                );
                Vec::new()
            }
        };

        let opening: Vec<ConversationTurn> = if stored.is_empty() {
            vec![ConversationTurn {
                speaker: Speaker::Companion,
                content: self.welcome_message(),
                category: Some(ResponseCategory::GeneralChat),
                timestamp: Utc::now(),
            }]
        } else {
            let mut turns: Vec<ConversationTurn> =
                stored.iter().flat_map(transcript_pair).collect();
            // keep the transcript to the same size as the query window
            let excess = turns.len().saturating_sub(HISTORY_LIMIT);
            turns.drain(..excess);
            turns
        };

        self.history = opening.clone();
        opening
    }

    fn welcome_message(&self) -> String {
        let nickname = self.profile.resolve().nickname;
        let options = prompts::welcome_messages(&nickname);
        options
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| options[0].clone())
    }

    /// Reply to one user message and record it. Blank input yields `None`.
    ///
    /// Storage failures are logged and do not affect the reply.
    pub async fn send_message(&mut self, text: &str) -> Option<ChatReply> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        let span = tracing::info_span!("turn", session = %logging::short_id(&self.id));
        let turn = self
            .engine
            .respond_turn(message, &self.profile, &self.history)
            .instrument(span)
            .await;

        self.remember(message, &turn.result);
        self.persist(message, turn.emotion, &turn.result);

        Some(ChatReply {
            text: turn.result.text,
            category: turn.result.category,
            emotion: turn.emotion,
        })
    }

    fn remember(&mut self, message: &str, result: &EngineResult) {
        let now = Utc::now();
        self.history.push(ConversationTurn {
            speaker: Speaker::User,
            content: message.to_string(),
            category: None,
            timestamp: now,
        });
        self.history.push(ConversationTurn {
            speaker: Speaker::Companion,
            content: result.text.clone(),
            category: Some(result.category),
            timestamp: now,
        });
        let excess = self.history.len().saturating_sub(HISTORY_LIMIT);
        self.history.drain(..excess);
    }

    fn persist(&self, message: &str, emotion: EmotionLabel, result: &EngineResult) {
        let turn = NewTurn {
            session_id: self.id.clone(),
            user_message: message.to_string(),
            companion_response: result.text.clone(),
            detected_emotion: emotion,
            category: result.category,
        };
        match self.store.record_turn(&turn) {
            Ok(_) => logging::log_memory(
                Some(&self.id),
                &format!(
                    "recorded turn emotion={} category={}",
                    emotion, result.category
                ),
            ),
            Err(e) => logging::log_error(
                Some(&self.id),
                &format!("failed to record turn: {}", e),
            ),
        }

        if let Some(entry) = MoodEntry::from_turn(emotion, message) {
            match self.store.record_mood(&entry) {
                Ok(()) => logging::log_memory(
                    Some(&self.id),
                    &format!(
                        "recorded mood score={} emotion={}",
                        entry.mood_score, entry.primary_emotion
                    ),
                ),
                Err(e) => logging::log_error(
                    Some(&self.id),
                    &format!("failed to record mood: {}", e),
                ),
            }
        }
    }
}

fn transcript_pair(turn: &StoredTurn) -> [ConversationTurn; 2] {
    let timestamp = DateTime::parse_from_rfc3339(&turn.created_at)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    [
        ConversationTurn {
            speaker: Speaker::User,
            content: turn.user_message.clone(),
            category: None,
            timestamp,
        },
        ConversationTurn {
            speaker: Speaker::Companion,
            content: turn.companion_response.clone(),
            category: Some(turn.category),
            timestamp,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::generation::{GenerateOptions, GenerationError, GenerativeTextClient};
    use crate::jokes::JokeRotator;
    use crate::profile::AgeGroup;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoClient;

    #[async_trait]
    impl GenerativeTextClient for EchoClient {
        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerateOptions,
        ) -> Result<String, GenerationError> {
            Ok("I'm here for you.".to_string())
        }
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl PersistenceStore for BrokenStore {
        fn record_turn(&self, _turn: &NewTurn) -> Result<StoredTurn, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        fn record_mood(&self, _entry: &MoodEntry) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        fn recent_turns(&self, _limit: usize) -> Result<Vec<StoredTurn>, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        fn load_profile(&self) -> Result<Option<UserProfile>, StoreError> {
            Ok(None)
        }
        fn save_profile(&self, _profile: &UserProfile) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
        fn mood_insights(&self, _now: DateTime<Utc>) -> Result<MoodInsights, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    fn session<S: PersistenceStore>(store: S) -> ChatSession<S> {
        let engine =
            ResponseEngine::with_jokes(Arc::new(EchoClient), JokeRotator::with_seed(5));
        ChatSession::start(engine, store, UserProfile::new("Sam", AgeGroup::Teen))
    }

    #[test]
    fn test_first_conversation_gets_welcome() {
        let mut chat = session(Database::open_in_memory().unwrap());
        let opening = chat.opening_messages();
        assert_eq!(opening.len(), 1);
        assert_eq!(opening[0].speaker, Speaker::Companion);
        assert!(opening[0].content.contains("Sam"));
    }

    #[tokio::test]
    async fn test_turns_and_moods_are_recorded() {
        let mut chat = session(Database::open_in_memory().unwrap());

        let reply = chat.send_message("  I'm so sad today  ").await.unwrap();
        assert_eq!(reply.emotion, EmotionLabel::Sad);
        assert_eq!(reply.category, ResponseCategory::ComfortJoke);

        chat.send_message("nothing in particular").await.unwrap();

        let turns = chat.store().recent_turns(10).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].user_message, "I'm so sad today");
        assert_eq!(turns[0].session_id, chat.id());
        assert_eq!(turns[1].detected_emotion, EmotionLabel::Neutral);

        // neutral turns do not produce a mood entry
        let moods = chat.store().mood_history(10).unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].primary_emotion, EmotionLabel::Sad);
        assert_eq!(moods[0].mood_score, 3);
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let mut chat = session(Database::open_in_memory().unwrap());
        assert!(chat.send_message("   ").await.is_none());
        assert!(chat.store().recent_turns(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopening_shows_stored_history() {
        let db = Database::open_in_memory().unwrap();
        let mut chat = session(db);
        chat.send_message("I got the job, I'm thrilled").await.unwrap();

        let opening = chat.opening_messages();
        assert_eq!(opening.len(), 2);
        assert_eq!(opening[0].speaker, Speaker::User);
        assert_eq!(opening[1].category, Some(ResponseCategory::Celebration));
    }

    #[tokio::test]
    async fn test_storage_failure_still_replies() {
        let mut chat = session(BrokenStore);
        assert_eq!(chat.opening_messages().len(), 1);

        let reply = chat.send_message("I want to kill myself").await.unwrap();
        assert_eq!(reply.category, ResponseCategory::CrisisSupport);
        assert!(reply.text.contains("988"));
    }

    #[tokio::test]
    async fn test_profile_update_applies_to_next_reply() {
        let mut chat = session(Database::open_in_memory().unwrap());
        chat.update_profile(UserProfile::new("Alex", AgeGroup::Senior))
            .unwrap();

        let stored = chat.store().load_profile().unwrap().unwrap();
        assert_eq!(stored.nickname.as_deref(), Some("Alex"));
        assert_eq!(stored.age_group.as_deref(), Some("senior"));

        let reply = chat.send_message("I just want to die").await.unwrap();
        assert!(reply.text.contains("Alex"));
    }

    #[test]
    fn test_failed_profile_update_keeps_old_profile() {
        let mut chat = session(BrokenStore);
        assert!(chat
            .update_profile(UserProfile::new("Alex", AgeGroup::Senior))
            .is_err());
        assert_eq!(chat.profile().nickname.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn test_mood_insights_reflect_session_turns() {
        let mut chat = session(Database::open_in_memory().unwrap());
        chat.send_message("I feel so lonely tonight").await.unwrap();
        chat.send_message("hello there").await.unwrap();

        let insights = chat.mood_insights().unwrap();
        assert_eq!(insights.stats.total_conversations, 2);
        assert_eq!(insights.stats.total_mood_entries, 1);
        assert_eq!(insights.top_emotions[0].emotion, EmotionLabel::Lonely);
    }
}
