use crate::crisis::CrisisDetector;
use crate::dispatcher::{Dispatch, ResponseCategory, ResponseDispatcher};
use crate::emotion::{EmotionClassifier, EmotionLabel};
use crate::generation::{GenerateOptions, GenerativeTextClient};
use crate::jokes::JokeRotator;
use crate::logging;
use crate::profile::UserProfile;
use crate::prompts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Companion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
    pub category: Option<ResponseCategory>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult {
    pub text: String,
    pub category: ResponseCategory,
}

/// An [`EngineResult`] together with the label that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTurn {
    pub emotion: EmotionLabel,
    pub result: EngineResult,
}

/// Per-conversation response pipeline.
///
/// Owns the joke rotator, so one engine must not be shared between
/// conversations. `respond` takes `&mut self`, which keeps calls against a
/// single conversation serialized.
pub struct ResponseEngine {
    client: Arc<dyn GenerativeTextClient>,
    crisis: CrisisDetector,
    classifier: EmotionClassifier,
    jokes: JokeRotator,
}

impl ResponseEngine {
    pub fn new(client: Arc<dyn GenerativeTextClient>) -> Self {
        Self::with_jokes(client, JokeRotator::new())
    }

    pub fn with_jokes(client: Arc<dyn GenerativeTextClient>, jokes: JokeRotator) -> Self {
        Self {
            client,
            crisis: CrisisDetector::new(),
            classifier: EmotionClassifier::new(),
            jokes,
        }
    }

    /// Produce Emma's reply to one message. Never fails.
    ///
    /// `history` is accepted so callers can pass the conversation so far,
    /// but neither classification nor dispatch reads it.
    pub async fn respond(
        &mut self,
        message: &str,
        profile: &UserProfile,
        history: &[ConversationTurn],
    ) -> EngineResult {
        self.respond_turn(message, profile, history).await.result
    }

    /// Same as [`respond`](Self::respond) but also reports the detected
    /// label, which the mood log needs.
    pub async fn respond_turn(
        &mut self,
        message: &str,
        profile: &UserProfile,
        _history: &[ConversationTurn],
    ) -> EngineTurn {
        let profile = profile.resolve();

        let emotion = match self.crisis.matched_keyword(message) {
            Some(keyword) => {
                logging::log_routing(None, &format!("crisis override (matched {:?})", keyword));
                EmotionLabel::Crisis
            }
            None => {
                let scores = self.classifier.scores(message);
                let emotion = scores.winner();
                logging::log_routing(None, &format!("classified {} [{}]", emotion, scores));
                emotion
            }
        };

        let dispatch = ResponseDispatcher::dispatch(emotion, message, &profile, &mut self.jokes);

        let result = match dispatch {
            Dispatch::Canned { text, category } => EngineResult { text, category },
            Dispatch::Generate { prompt, category } => {
                let options = GenerateOptions {
                    allow_internet_context: false,
                };
                match self.client.generate(&prompt, options).await {
                    Ok(text) if !text.trim().is_empty() => {
                        logging::log_agent(
                            None,
                            &format!("generated {} reply ({} chars)", category, text.len()),
                        );
                        EngineResult { text, category }
                    }
                    Ok(_) => {
                        logging::log_error(None, "generator returned empty text, using fallback");
                        Self::fallback(&profile.nickname)
                    }
                    Err(e) => {
                        logging::log_error(
                            None,
                            &format!("generation failed, using fallback: {}", e),
                        );
                        Self::fallback(&profile.nickname)
                    }
                }
            }
        };

        EngineTurn { emotion, result }
    }

    fn fallback(nickname: &str) -> EngineResult {
        EngineResult {
            text: prompts::fallback_message(nickname),
            category: ResponseCategory::GeneralChat,
        }
    }
}
