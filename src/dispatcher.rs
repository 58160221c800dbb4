use crate::emotion::EmotionLabel;
use crate::jokes::JokeRotator;
use crate::profile::ResolvedProfile;
use crate::prompts;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    GeneralChat,
    ComfortJoke,
    Advice,
    CrisisSupport,
    Celebration,
}

impl ResponseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCategory::GeneralChat => "general_chat",
            ResponseCategory::ComfortJoke => "comfort_joke",
            ResponseCategory::Advice => "advice",
            ResponseCategory::CrisisSupport => "crisis_support",
            ResponseCategory::Celebration => "celebration",
        }
    }

    pub fn from_str(s: &str) -> Option<ResponseCategory> {
        match s.to_lowercase().as_str() {
            "general_chat" => Some(ResponseCategory::GeneralChat),
            "comfort_joke" => Some(ResponseCategory::ComfortJoke),
            "advice" => Some(ResponseCategory::Advice),
            "crisis_support" => Some(ResponseCategory::CrisisSupport),
            "celebration" => Some(ResponseCategory::Celebration),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a classified message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Finished reply; no generator call.
    Canned {
        text: String,
        category: ResponseCategory,
    },
    /// Prompt to hand to the generator.
    Generate {
        prompt: String,
        category: ResponseCategory,
    },
}

impl Dispatch {
    pub fn category(&self) -> ResponseCategory {
        match self {
            Dispatch::Canned { category, .. } | Dispatch::Generate { category, .. } => *category,
        }
    }
}

/// Category a label maps to, without building anything.
pub fn category_for(emotion: EmotionLabel) -> ResponseCategory {
    match emotion {
        EmotionLabel::Crisis => ResponseCategory::CrisisSupport,
        EmotionLabel::Sad | EmotionLabel::Lonely => ResponseCategory::ComfortJoke,
        EmotionLabel::Stressed | EmotionLabel::Anxious | EmotionLabel::Angry => {
            ResponseCategory::Advice
        }
        EmotionLabel::Happy => ResponseCategory::Celebration,
        EmotionLabel::Neutral => ResponseCategory::GeneralChat,
    }
}

pub struct ResponseDispatcher;

impl ResponseDispatcher {
    /// Map a label to a reply plan. Only the sad and lonely branches touch
    /// the rotator.
    pub fn dispatch(
        emotion: EmotionLabel,
        message: &str,
        profile: &ResolvedProfile,
        jokes: &mut JokeRotator,
    ) -> Dispatch {
        let category = category_for(emotion);

        if emotion == EmotionLabel::Crisis {
            return Dispatch::Canned {
                text: prompts::crisis_message(&profile.nickname),
                category,
            };
        }

        let base = prompts::base_prompt(profile);
        let prompt = match emotion {
            EmotionLabel::Sad => prompts::sad_prompt(&base, jokes.next(EmotionLabel::Sad), message),
            EmotionLabel::Lonely => {
                prompts::lonely_prompt(&base, jokes.next(EmotionLabel::Lonely), message)
            }
            EmotionLabel::Stressed | EmotionLabel::Anxious => {
                prompts::stress_prompt(&base, message)
            }
            EmotionLabel::Angry => prompts::anger_prompt(&base, message),
            EmotionLabel::Happy => prompts::celebration_prompt(&base, message),
            EmotionLabel::Neutral | EmotionLabel::Crisis => prompts::general_prompt(&base, message),
        };

        Dispatch::Generate { prompt, category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jokes::SAD_JOKES;
    use crate::profile::{AgeGroup, UserProfile};

    fn teen_sam() -> ResolvedProfile {
        UserProfile::new("Sam", AgeGroup::Teen).resolve()
    }

    fn prompt_of(dispatch: &Dispatch) -> &str {
        match dispatch {
            Dispatch::Generate { prompt, .. } => prompt,
            Dispatch::Canned { .. } => panic!("expected a prompt, got a canned reply"),
        }
    }

    #[test]
    fn test_crisis_is_canned_and_skips_jokes() {
        let mut jokes = JokeRotator::with_seed(0);
        let dispatch =
            ResponseDispatcher::dispatch(EmotionLabel::Crisis, "x", &teen_sam(), &mut jokes);
        match dispatch {
            Dispatch::Canned { text, category } => {
                assert_eq!(category, ResponseCategory::CrisisSupport);
                assert!(text.contains("Sam"));
                assert!(text.contains("988"));
                assert!(text.contains("741741"));
            }
            other => panic!("unexpected dispatch: {other:?}"),
        }
        assert_eq!(jokes.used_count(EmotionLabel::Sad), 0);
    }

    #[test]
    fn test_sad_embeds_joke_tone_and_message() {
        let mut jokes = JokeRotator::with_seed(0);
        let message = "I'm so sad and lonely today";
        let dispatch =
            ResponseDispatcher::dispatch(EmotionLabel::Sad, message, &teen_sam(), &mut jokes);
        assert_eq!(dispatch.category(), ResponseCategory::ComfortJoke);

        let prompt = prompt_of(&dispatch);
        assert!(prompt.contains("Sam"));
        assert!(prompt.contains(prompts::age_tone(AgeGroup::Teen)));
        assert!(prompt.contains(message));
        assert!(SAD_JOKES.iter().any(|j| prompt.contains(j)));
        assert_eq!(jokes.used_count(EmotionLabel::Sad), 1);
    }

    #[test]
    fn test_lonely_draws_from_sad_bank() {
        let mut jokes = JokeRotator::with_seed(0);
        let dispatch = ResponseDispatcher::dispatch(
            EmotionLabel::Lonely,
            "nobody calls",
            &teen_sam(),
            &mut jokes,
        );
        assert_eq!(dispatch.category(), ResponseCategory::ComfortJoke);
        assert!(prompt_of(&dispatch).contains("lonely or isolated"));
        assert_eq!(jokes.used_count(EmotionLabel::Sad), 1);
    }

    #[test]
    fn test_stressed_and_anxious_share_prompt() {
        let mut jokes = JokeRotator::with_seed(0);
        let profile = teen_sam();
        let stressed =
            ResponseDispatcher::dispatch(EmotionLabel::Stressed, "m", &profile, &mut jokes);
        let anxious =
            ResponseDispatcher::dispatch(EmotionLabel::Anxious, "m", &profile, &mut jokes);
        assert_eq!(stressed, anxious);
        assert_eq!(stressed.category(), ResponseCategory::Advice);
    }

    #[test]
    fn test_angry_is_advice_with_its_own_prompt() {
        let mut jokes = JokeRotator::with_seed(0);
        let profile = teen_sam();
        let angry = ResponseDispatcher::dispatch(EmotionLabel::Angry, "m", &profile, &mut jokes);
        let stressed =
            ResponseDispatcher::dispatch(EmotionLabel::Stressed, "m", &profile, &mut jokes);
        assert_eq!(angry.category(), ResponseCategory::Advice);
        assert_ne!(prompt_of(&angry), prompt_of(&stressed));
        assert!(prompt_of(&angry).contains("anger is a valid emotion"));
    }

    #[test]
    fn test_happy_and_neutral() {
        let mut jokes = JokeRotator::with_seed(0);
        let profile = teen_sam();
        let happy = ResponseDispatcher::dispatch(EmotionLabel::Happy, "m", &profile, &mut jokes);
        let neutral =
            ResponseDispatcher::dispatch(EmotionLabel::Neutral, "m", &profile, &mut jokes);
        assert_eq!(happy.category(), ResponseCategory::Celebration);
        assert_eq!(neutral.category(), ResponseCategory::GeneralChat);
        assert!(prompt_of(&neutral).contains("natural, emotionally supportive conversation"));
    }

    #[test]
    fn test_missing_age_group_uses_adult_tone() {
        let mut jokes = JokeRotator::with_seed(0);
        let profile = UserProfile {
            nickname: Some("Lee".to_string()),
            age_group: None,
        }
        .resolve();
        let dispatch =
            ResponseDispatcher::dispatch(EmotionLabel::Neutral, "hi", &profile, &mut jokes);
        assert!(prompt_of(&dispatch).contains(prompts::age_tone(AgeGroup::Adult)));
    }

    #[test]
    fn test_category_strings() {
        assert_eq!(ResponseCategory::CrisisSupport.as_str(), "crisis_support");
        assert_eq!(
            ResponseCategory::from_str("comfort_joke"),
            Some(ResponseCategory::ComfortJoke)
        );
        assert_eq!(
            serde_json::to_string(&ResponseCategory::GeneralChat).unwrap(),
            "\"general_chat\""
        );
    }
}
