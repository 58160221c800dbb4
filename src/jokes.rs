use crate::emotion::EmotionLabel;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

pub const SAD_JOKES: &[&str] = &[
    "Here's something to warm your heart: Why don't scientists trust atoms? Because they make up everything... just like how you matter more than you know! 💕",
    "Let me share a gentle smile with you: What do you call a bear with no teeth? A gummy bear! Your smile is even sweeter though 🐻",
    "To brighten your day: Why did the coffee file a police report? It got mugged! But unlike coffee, your feelings are safe with me ☕💙",
];

pub const STRESSED_JOKES: &[&str] = &[
    "Here's a calming thought: What's the best thing about Switzerland? I don't know, but the flag is a big plus! Just like you're a big plus in this world 🇨🇭",
    "Let's breathe and smile: Why don't eggs tell jokes? They'd crack each other up! Take a moment to crack a smile too 🥚😊",
];

/// Bank for an emotion. Only sad and stressed have their own; everything
/// else borrows the sad bank.
pub fn joke_bank(emotion: EmotionLabel) -> (EmotionLabel, &'static [&'static str]) {
    match emotion {
        EmotionLabel::Stressed => (EmotionLabel::Stressed, STRESSED_JOKES),
        _ => (EmotionLabel::Sad, SAD_JOKES),
    }
}

/// Hands out jokes without repeats until a bank runs dry, then starts over.
///
/// One rotator per conversation. Used jokes are tracked per bank, so a used
/// set never grows past its own bank's size.
pub struct JokeRotator {
    used: HashMap<EmotionLabel, HashSet<&'static str>>,
    rng: StdRng,
}

impl JokeRotator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic rotator for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            used: HashMap::new(),
            rng,
        }
    }

    pub fn next(&mut self, emotion: EmotionLabel) -> &'static str {
        let (bank_key, bank) = joke_bank(emotion);
        let used = self.used.entry(bank_key).or_default();

        let mut available: Vec<&'static str> =
            bank.iter().copied().filter(|j| !used.contains(j)).collect();

        if available.is_empty() {
            used.clear();
            available = bank.to_vec();
        }

        // banks are non-empty consts, so choose only fails on an empty slice
        let joke = available.choose(&mut self.rng).copied().unwrap_or(bank[0]);
        used.insert(joke);
        joke
    }

    /// Number of jokes already served from the bank `emotion` resolves to.
    pub fn used_count(&self, emotion: EmotionLabel) -> usize {
        let (bank_key, _) = joke_bank(emotion);
        self.used.get(&bank_key).map_or(0, HashSet::len)
    }
}

impl Default for JokeRotator {
    fn default() -> Self {
        Self::new()
    }
}
