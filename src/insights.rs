//! Mood insights over stored check-ins and conversations.
//!
//! Days are bucketed in UTC, the same clock the store writes timestamps with.

use crate::emotion::EmotionLabel;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Length of the rolling window used for averages and the weekly series.
pub const WEEK_DAYS: i64 = 7;
/// How far back emotion frequency looks.
pub const FREQUENCY_DAYS: i64 = 30;
pub const TOP_EMOTIONS: usize = 5;

/// A stored mood entry reduced to what the aggregations read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodSample {
    pub mood_score: u8,
    pub primary_emotion: EmotionLabel,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentStats {
    /// Mean score over the last seven days, to one decimal. 0 with no entries.
    pub average_mood_7d: f64,
    pub total_conversations: usize,
    pub conversations_7d: usize,
    pub total_mood_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMood {
    pub date: NaiveDate,
    pub average_mood: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionCount {
    pub emotion: EmotionLabel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodInsights {
    pub stats: RecentStats,
    /// Seven entries, oldest day first, ending today.
    pub weekly: Vec<DayMood>,
    pub top_emotions: Vec<EmotionCount>,
}

impl MoodInsights {
    /// `moods` may arrive in any order; `conversation_times` only needs to
    /// cover the last week.
    pub fn compute(
        moods: &[MoodSample],
        conversation_times: &[DateTime<Utc>],
        total_conversations: usize,
        total_mood_entries: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            stats: recent_stats(
                moods,
                conversation_times,
                total_conversations,
                total_mood_entries,
                now,
            ),
            weekly: weekly_moods(moods, now),
            top_emotions: emotion_frequency(moods, now),
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(scores: impl Iterator<Item = u8>) -> (f64, usize) {
    let (sum, count) = scores.fold((0u32, 0usize), |(sum, count), s| (sum + s as u32, count + 1));
    if count == 0 {
        (0.0, 0)
    } else {
        (round_tenth(sum as f64 / count as f64), count)
    }
}

pub fn recent_stats(
    moods: &[MoodSample],
    conversation_times: &[DateTime<Utc>],
    total_conversations: usize,
    total_mood_entries: usize,
    now: DateTime<Utc>,
) -> RecentStats {
    let cutoff = now - Duration::days(WEEK_DAYS);
    let (average_mood_7d, _) = average(
        moods
            .iter()
            .filter(|m| m.recorded_at > cutoff)
            .map(|m| m.mood_score),
    );

    RecentStats {
        average_mood_7d,
        total_conversations,
        conversations_7d: conversation_times.iter().filter(|t| **t > cutoff).count(),
        total_mood_entries,
    }
}

/// Per-day average for today and the six days before it.
pub fn weekly_moods(moods: &[MoodSample], now: DateTime<Utc>) -> Vec<DayMood> {
    let today = now.date_naive();
    (0..WEEK_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let (average_mood, count) = average(
                moods
                    .iter()
                    .filter(|m| m.recorded_at.date_naive() == date)
                    .map(|m| m.mood_score),
            );
            DayMood {
                date,
                average_mood,
                count,
            }
        })
        .collect()
}

/// Most frequent emotions of the last thirty days, highest count first.
/// Ties keep the order the emotions were first seen in `moods`.
pub fn emotion_frequency(moods: &[MoodSample], now: DateTime<Utc>) -> Vec<EmotionCount> {
    let cutoff = now - Duration::days(FREQUENCY_DAYS);
    let mut counts: Vec<EmotionCount> = Vec::new();
    for mood in moods.iter().filter(|m| m.recorded_at > cutoff) {
        match counts.iter_mut().find(|c| c.emotion == mood.primary_emotion) {
            Some(entry) => entry.count += 1,
            None => counts.push(EmotionCount {
                emotion: mood.primary_emotion,
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_EMOTIONS);
    counts
}

impl fmt::Display for MoodInsights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(f, "Average mood (7 days): {}/10", stats.average_mood_7d)?;
        writeln!(
            f,
            "Conversations: {} total, {} this week",
            stats.total_conversations, stats.conversations_7d
        )?;
        writeln!(f, "Mood check-ins: {}", stats.total_mood_entries)?;

        writeln!(f, "This week:")?;
        for day in &self.weekly {
            if day.count == 0 {
                writeln!(f, "  {}  -", day.date.format("%b %d"))?;
            } else {
                writeln!(
                    f,
                    "  {}  {} ({} check-ins)",
                    day.date.format("%b %d"),
                    day.average_mood,
                    day.count
                )?;
            }
        }

        if self.top_emotions.is_empty() {
            write!(f, "No emotions logged yet.")
        } else {
            let top: Vec<String> = self
                .top_emotions
                .iter()
                .map(|e| format!("{} ({})", e.emotion, e.count))
                .collect();
            write!(f, "Top emotions: {}", top.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
    }

    fn sample(score: u8, emotion: EmotionLabel, hours_ago: i64) -> MoodSample {
        MoodSample {
            mood_score: score,
            primary_emotion: emotion,
            recorded_at: now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_empty_history() {
        let insights = MoodInsights::compute(&[], &[], 0, 0, now());
        assert_eq!(insights.stats.average_mood_7d, 0.0);
        assert_eq!(insights.stats.conversations_7d, 0);
        assert_eq!(insights.weekly.len(), 7);
        assert!(insights.weekly.iter().all(|d| d.count == 0 && d.average_mood == 0.0));
        assert!(insights.top_emotions.is_empty());
        assert!(insights.to_string().contains("No emotions logged yet."));
    }

    #[test]
    fn test_weekly_days_end_today_and_round_to_a_tenth() {
        let moods = vec![
            sample(8, EmotionLabel::Happy, 1),
            sample(9, EmotionLabel::Happy, 2),
            sample(8, EmotionLabel::Happy, 3),
            // two days back
            sample(2, EmotionLabel::Lonely, 48),
            sample(3, EmotionLabel::Sad, 49),
            // outside the week
            sample(1, EmotionLabel::Crisis, 24 * 9),
        ];
        let weekly = weekly_moods(&moods, now());

        assert_eq!(weekly[0].date, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        assert_eq!(weekly[6].date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(weekly[6].average_mood, 8.3);
        assert_eq!(weekly[6].count, 3);
        assert_eq!(weekly[4].average_mood, 2.5);
        assert_eq!(weekly[5].count, 0);
        assert_eq!(weekly.iter().map(|d| d.count).sum::<usize>(), 5);
    }

    #[test]
    fn test_recent_stats_use_a_rolling_week() {
        let moods = vec![
            sample(3, EmotionLabel::Sad, 2),
            sample(2, EmotionLabel::Angry, 30),
            sample(2, EmotionLabel::Anxious, 24 * 6),
            sample(9, EmotionLabel::Happy, 24 * 8),
        ];
        let conversations = vec![now() - Duration::hours(1), now() - Duration::days(10)];

        let stats = recent_stats(&moods, &conversations, 12, 4, now());
        assert_eq!(stats.average_mood_7d, 2.3);
        assert_eq!(stats.conversations_7d, 1);
        assert_eq!(stats.total_conversations, 12);
        assert_eq!(stats.total_mood_entries, 4);
    }

    #[test]
    fn test_top_five_by_count() {
        let mut moods = Vec::new();
        for (emotion, n) in [
            (EmotionLabel::Sad, 2),
            (EmotionLabel::Happy, 4),
            (EmotionLabel::Lonely, 1),
            (EmotionLabel::Stressed, 3),
            (EmotionLabel::Angry, 2),
            (EmotionLabel::Anxious, 5),
        ] {
            for _ in 0..n {
                moods.push(sample(5, emotion, 5));
            }
        }
        moods.push(sample(1, EmotionLabel::Crisis, 24 * 40));

        let top = emotion_frequency(&moods, now());
        let order: Vec<(EmotionLabel, usize)> = top.iter().map(|c| (c.emotion, c.count)).collect();
        assert_eq!(
            order,
            vec![
                (EmotionLabel::Anxious, 5),
                (EmotionLabel::Happy, 4),
                (EmotionLabel::Stressed, 3),
                (EmotionLabel::Sad, 2),
                (EmotionLabel::Angry, 2),
            ]
        );
    }
}
