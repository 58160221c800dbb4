use crate::dispatcher::ResponseCategory;
use crate::emotion::EmotionLabel;
use crate::error::StoreError;
use crate::insights::{MoodInsights, MoodSample, FREQUENCY_DAYS, WEEK_DAYS};
use crate::mood::MoodEntry;
use crate::profile::UserProfile;
use crate::store::{NewTurn, PersistenceStore, StoredTurn};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    -- Single-row profile (nickname and age group from onboarding)
    CREATE TABLE IF NOT EXISTS user_profile (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        nickname TEXT,
        age_group TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    -- One row per exchange
    CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL,
        user_message TEXT NOT NULL,
        companion_response TEXT NOT NULL,
        detected_emotion TEXT NOT NULL,
        response_type TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_conversations_created ON conversations(created_at);

    -- Mood check-ins derived from non-neutral turns
    CREATE TABLE IF NOT EXISTS mood_entries (
        id INTEGER PRIMARY KEY,
        mood_score INTEGER NOT NULL,
        primary_emotion TEXT NOT NULL,
        notes TEXT NOT NULL,
        checkin_type TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
";

/// SQLite-backed [`PersistenceStore`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite itself consistent
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Most recent mood entries, newest first.
    pub fn mood_history(&self, limit: usize) -> Result<Vec<MoodEntry>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT mood_score, primary_emotion, notes, checkin_type
             FROM mood_entries
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (score, emotion, notes, checkin_type) = row?;
            entries.push(MoodEntry {
                mood_score: clamp_score(score),
                primary_emotion: parse_emotion(&emotion)?,
                notes,
                checkin_type,
            });
        }
        Ok(entries)
    }
}

fn parse_emotion(value: &str) -> Result<EmotionLabel, StoreError> {
    EmotionLabel::from_str(value).ok_or_else(|| StoreError::InvalidValue {
        column: "detected_emotion".to_string(),
        value: value.to_string(),
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidValue {
            column: "created_at".to_string(),
            value: value.to_string(),
        })
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, u8::MAX as i64) as u8
}

fn parse_category(value: &str) -> Result<ResponseCategory, StoreError> {
    ResponseCategory::from_str(value).ok_or_else(|| StoreError::InvalidValue {
        column: "response_type".to_string(),
        value: value.to_string(),
    })
}

impl PersistenceStore for Database {
    fn record_turn(&self, turn: &NewTurn) -> Result<StoredTurn, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        self.connection().execute(
            "INSERT INTO conversations (id, session_id, user_message, companion_response, detected_emotion, response_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                turn.session_id,
                turn.user_message,
                turn.companion_response,
                turn.detected_emotion.as_str(),
                turn.category.as_str(),
                now
            ],
        )?;

        Ok(StoredTurn {
            id,
            session_id: turn.session_id.clone(),
            user_message: turn.user_message.clone(),
            companion_response: turn.companion_response.clone(),
            detected_emotion: turn.detected_emotion,
            category: turn.category,
            created_at: now,
        })
    }

    fn record_mood(&self, entry: &MoodEntry) -> Result<(), StoreError> {
        self.connection().execute(
            "INSERT INTO mood_entries (mood_score, primary_emotion, notes, checkin_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.mood_score,
                entry.primary_emotion.as_str(),
                entry.notes,
                entry.checkin_type,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn recent_turns(&self, limit: usize) -> Result<Vec<StoredTurn>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, user_message, companion_response, detected_emotion, response_type, created_at
             FROM conversations
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut turns = Vec::new();
        for row in rows {
            let (id, session_id, user_message, companion_response, emotion, category, created_at) =
                row?;
            turns.push(StoredTurn {
                id,
                session_id,
                user_message,
                companion_response,
                detected_emotion: parse_emotion(&emotion)?,
                category: parse_category(&category)?,
                created_at,
            });
        }

        turns.reverse();
        Ok(turns)
    }

    fn load_profile(&self) -> Result<Option<UserProfile>, StoreError> {
        let profile = self
            .connection()
            .query_row(
                "SELECT nickname, age_group FROM user_profile WHERE id = 1",
                [],
                |row| {
                    Ok(UserProfile {
                        nickname: row.get(0)?,
                        age_group: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO user_profile (id, nickname, age_group, created_at, updated_at)
             VALUES (1, ?1, ?2, ?3, ?3)
             ON CONFLICT(id) DO UPDATE SET nickname = ?1, age_group = ?2, updated_at = ?3",
            params![profile.nickname, profile.age_group, now],
        )?;
        Ok(())
    }

    fn mood_insights(&self, now: DateTime<Utc>) -> Result<MoodInsights, StoreError> {
        let conn = self.connection();
        let total_conversations: i64 =
            conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;
        let total_mood_entries: i64 =
            conn.query_row("SELECT COUNT(*) FROM mood_entries", [], |row| row.get(0))?;

        // Stored timestamps are all UTC RFC 3339, so a day of slack on the
        // text comparison is enough; the exact cut happens in `insights`.
        let mood_since = (now - Duration::days(FREQUENCY_DAYS + 1)).to_rfc3339();
        let mut stmt = conn.prepare(
            "SELECT mood_score, primary_emotion, created_at
             FROM mood_entries
             WHERE created_at >= ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![mood_since], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut moods = Vec::new();
        for row in rows {
            let (score, emotion, created_at) = row?;
            moods.push(MoodSample {
                mood_score: clamp_score(score),
                primary_emotion: parse_emotion(&emotion)?,
                recorded_at: parse_timestamp(&created_at)?,
            });
        }

        let conversation_since = (now - Duration::days(WEEK_DAYS + 1)).to_rfc3339();
        let mut stmt = conn.prepare("SELECT created_at FROM conversations WHERE created_at >= ?1")?;
        let rows = stmt.query_map(params![conversation_since], |row| row.get::<_, String>(0))?;

        let mut conversation_times = Vec::new();
        for row in rows {
            conversation_times.push(parse_timestamp(&row?)?);
        }

        Ok(MoodInsights::compute(
            &moods,
            &conversation_times,
            total_conversations as usize,
            total_mood_entries as usize,
            now,
        ))
    }
}
