// Crisis screen. Runs before emotion classification and overrides it.
//
// Matching is plain lower-cased substring containment, so "vitamin pills"
// trips it too. That sensitivity is kept as-is until someone decides the
// false positives are worth trading away.

pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "hurt myself",
    "self harm",
    "cutting",
    "overdose",
    "jump off",
    "hanging",
    "pills",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct CrisisDetector;

impl CrisisDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, message: &str) -> bool {
        self.matched_keyword(message).is_some()
    }

    /// First crisis phrase found in the message, for logging.
    pub fn matched_keyword(&self, message: &str) -> Option<&'static str> {
        let lower = message.to_lowercase();
        CRISIS_KEYWORDS.iter().copied().find(|kw| lower.contains(kw))
    }
}
