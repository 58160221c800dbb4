//! Keyword-weighted emotion classifier.
//!
//! Each emotion has three keyword tiers. A keyword counts once if it appears
//! anywhere in the lower-cased message (plain substring, no word boundaries),
//! contributing 3, 2 or 1 points depending on its tier. The highest total
//! wins; ties go to whichever emotion comes first in [`CLASSIFICATION_ORDER`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Neutral,
    Sad,
    Stressed,
    Angry,
    Happy,
    Lonely,
    Anxious,
    Crisis,
}

impl EmotionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Stressed => "stressed",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Lonely => "lonely",
            EmotionLabel::Anxious => "anxious",
            EmotionLabel::Crisis => "crisis",
        }
    }

    pub fn from_str(s: &str) -> Option<EmotionLabel> {
        match s.to_lowercase().as_str() {
            "neutral" => Some(EmotionLabel::Neutral),
            "sad" => Some(EmotionLabel::Sad),
            "stressed" => Some(EmotionLabel::Stressed),
            "angry" => Some(EmotionLabel::Angry),
            "happy" => Some(EmotionLabel::Happy),
            "lonely" => Some(EmotionLabel::Lonely),
            "anxious" => Some(EmotionLabel::Anxious),
            "crisis" => Some(EmotionLabel::Crisis),
            _ => None,
        }
    }

    /// Coarse bucket shown in the mood picker, which only offers
    /// happy / neutral / sad / stressed.
    pub fn display_bucket(&self) -> EmotionLabel {
        match self {
            EmotionLabel::Anxious | EmotionLabel::Angry => EmotionLabel::Stressed,
            EmotionLabel::Lonely => EmotionLabel::Sad,
            other => *other,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const PRIMARY_WEIGHT: u32 = 3;
pub const SECONDARY_WEIGHT: u32 = 2;
pub const CONTEXT_WEIGHT: u32 = 1;

/// Keyword tiers for one emotion.
#[derive(Debug)]
pub struct KeywordTiers {
    pub primary: &'static [&'static str],
    pub secondary: &'static [&'static str],
    pub context: &'static [&'static str],
}

impl KeywordTiers {
    /// Sum of tier weights for every keyword present in `lower_message`.
    /// The caller lower-cases once for all emotions.
    fn score(&self, lower_message: &str) -> u32 {
        let tier = |words: &[&str], weight: u32| -> u32 {
            words
                .iter()
                .filter(|w| lower_message.contains(*w))
                .count() as u32
                * weight
        };

        tier(self.primary, PRIMARY_WEIGHT)
            + tier(self.secondary, SECONDARY_WEIGHT)
            + tier(self.context, CONTEXT_WEIGHT)
    }
}

/// Scoring order. Ties resolve to the earliest entry, so the order itself is
/// part of the classifier's observable behavior.
pub const CLASSIFICATION_ORDER: [EmotionLabel; 6] = [
    EmotionLabel::Sad,
    EmotionLabel::Stressed,
    EmotionLabel::Angry,
    EmotionLabel::Happy,
    EmotionLabel::Lonely,
    EmotionLabel::Anxious,
];

const SAD: KeywordTiers = KeywordTiers {
    primary: &["sad", "depressed", "crying", "heartbroken", "devastated", "miserable", "hopeless"],
    secondary: &["down", "blue", "upset", "hurt", "disappointed", "broken", "empty", "low"],
    context: &["lost", "miss", "gone", "left", "alone", "rejected"],
};

const STRESSED: KeywordTiers = KeywordTiers {
    primary: &["stressed", "overwhelmed", "anxious", "panic", "worried", "pressure"],
    secondary: &["busy", "exhausted", "tired", "can't cope", "too much", "burden"],
    context: &["deadline", "work", "school", "exam", "bills", "money", "responsibility"],
};

const ANGRY: KeywordTiers = KeywordTiers {
    primary: &["angry", "mad", "furious", "rage", "hate", "irritated"],
    secondary: &["annoyed", "frustrated", "upset", "pissed", "livid"],
    context: &["unfair", "stupid", "ridiculous", "can't believe", "so annoying"],
};

const HAPPY: KeywordTiers = KeywordTiers {
    primary: &["happy", "joy", "excited", "thrilled", "elated", "amazing", "wonderful"],
    secondary: &["good", "great", "awesome", "fantastic", "perfect", "love"],
    context: &["celebration", "achievement", "success", "proud", "accomplished"],
};

const LONELY: KeywordTiers = KeywordTiers {
    primary: &["lonely", "alone", "isolated", "disconnected"],
    secondary: &["nobody", "no one", "by myself", "empty"],
    context: &["friends", "family", "relationships", "social", "connection"],
};

const ANXIOUS: KeywordTiers = KeywordTiers {
    primary: &["anxious", "nervous", "worried", "scared", "afraid"],
    secondary: &["uncertain", "unsure", "doubt", "fear"],
    context: &["future", "tomorrow", "what if", "might happen", "unknown"],
};

/// Keyword tiers for a classifiable emotion. `None` for neutral and crisis,
/// which are never scored.
pub fn lexicon(emotion: EmotionLabel) -> Option<&'static KeywordTiers> {
    match emotion {
        EmotionLabel::Sad => Some(&SAD),
        EmotionLabel::Stressed => Some(&STRESSED),
        EmotionLabel::Angry => Some(&ANGRY),
        EmotionLabel::Happy => Some(&HAPPY),
        EmotionLabel::Lonely => Some(&LONELY),
        EmotionLabel::Anxious => Some(&ANXIOUS),
        EmotionLabel::Neutral | EmotionLabel::Crisis => None,
    }
}

/// Per-emotion totals, in [`CLASSIFICATION_ORDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionScores(pub [(EmotionLabel, u32); 6]);

impl EmotionScores {
    pub fn get(&self, emotion: EmotionLabel) -> u32 {
        self.0
            .iter()
            .find(|(label, _)| *label == emotion)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    /// Highest-scoring emotion, earliest on ties; neutral when nothing scored.
    pub fn winner(&self) -> EmotionLabel {
        let mut best = (EmotionLabel::Neutral, 0);
        for &(label, score) in &self.0 {
            // strict > keeps the earlier emotion on ties
            if score > best.1 {
                best = (label, score);
            }
        }
        best.0
    }
}

impl std::fmt::Display for EmotionScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(label, score)| format!("{}={}", label, score))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionClassifier;

impl EmotionClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn scores(&self, message: &str) -> EmotionScores {
        let lower = message.to_lowercase();
        EmotionScores(CLASSIFICATION_ORDER.map(|label| {
            let score = lexicon(label).map(|tiers| tiers.score(&lower)).unwrap_or(0);
            (label, score)
        }))
    }

    /// Classify a message that has already passed the crisis screen.
    /// Never returns [`EmotionLabel::Crisis`].
    pub fn classify(&self, message: &str) -> EmotionLabel {
        self.scores(message).winner()
    }
}
