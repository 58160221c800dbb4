pub mod config;
pub mod crisis;
pub mod db;
pub mod dispatcher;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod generation;
pub mod insights;
pub mod jokes;
pub mod logging;
pub mod mood;
pub mod openai;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod store;

pub use dispatcher::ResponseCategory;
pub use emotion::EmotionLabel;
pub use engine::{ConversationTurn, EngineResult, ResponseEngine};
pub use generation::{GenerateOptions, GenerativeTextClient};
pub use insights::MoodInsights;
pub use profile::{AgeGroup, UserProfile};
pub use session::{ChatReply, ChatSession};

use config::Config;
use db::Database;
use engine::Speaker;
use openai::OpenAIClient;
use std::sync::Arc;
use store::PersistenceStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};

const EXIT_COMMANDS: &[&str] = &["/quit", "/exit"];
const FEELING_USAGE: &str = "usage: /feeling <happy|excited|neutral|sad|stressed>";
const PROFILE_USAGE: &str = "usage: /profile <nickname> <child|teen|adult|midlife|senior>";

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Quit,
    Mood,
    Feeling(String),
    Profile(UserProfile),
    Usage(&'static str),
    Message(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some(cmd) if EXIT_COMMANDS.contains(&cmd) => Command::Quit,
        Some("/mood") => Command::Mood,
        Some("/feeling") => match parts.next() {
            Some(mood) => Command::Feeling(mood.to_lowercase()),
            None => Command::Usage(FEELING_USAGE),
        },
        Some("/profile") => match (parts.next(), parts.next().and_then(AgeGroup::from_str)) {
            (Some(nickname), Some(age_group)) => {
                Command::Profile(UserProfile::new(nickname, age_group))
            }
            _ => Command::Usage(PROFILE_USAGE),
        },
        _ => Command::Message(line.to_string()),
    }
}

/// Check-in text for `/feeling`. Classifier labels go through the picker's
/// coarse buckets, so `/feeling lonely` offers the sad check-in.
fn feeling_prefill(mood: &str) -> Option<&'static str> {
    match EmotionLabel::from_str(mood) {
        Some(label) => prompts::suggested_message(label.display_bucket()),
        None => prompts::suggested_message_for(mood),
    }
}

fn reply_line(reply: &ChatReply) -> String {
    format!(
        "emma [{} | {}]> {}",
        reply.category,
        reply.emotion.display_bucket(),
        reply.text
    )
}

/// Settle which profile to use. Stored fields win, except those set through
/// `EMMA_NICKNAME` / `EMMA_AGE_GROUP`, which are written back.
fn load_profile<S: PersistenceStore>(store: &S, seed: &UserProfile) -> error::Result<UserProfile> {
    let profile = match store.load_profile()? {
        Some(stored) => {
            let merged = stored.overridden_by(seed);
            if merged == stored {
                return Ok(stored);
            }
            merged
        }
        None => seed.clone(),
    };
    store.save_profile(&profile)?;
    Ok(profile)
}

async fn say(stdout: &mut Stdout, line: &str) -> std::io::Result<()> {
    stdout.write_all(format!("{}\n", line).as_bytes()).await?;
    stdout.flush().await
}

async fn send(
    session: &mut ChatSession<Database>,
    stdout: &mut Stdout,
    text: &str,
) -> std::io::Result<()> {
    match session.send_message(text).await {
        Some(reply) => say(stdout, &reply_line(&reply)).await,
        None => Ok(()),
    }
}

async fn chat_loop(config: Config) -> error::Result<()> {
    let db = Database::open(&config.db_path)?;
    let profile = load_profile(&db, &config.seed_profile)?;
    let client = OpenAIClient::from_config(&config)?;
    let engine = ResponseEngine::new(Arc::new(client));
    let mut session = ChatSession::start(engine, db, profile);

    let mut stdout = tokio::io::stdout();
    for turn in session.opening_messages() {
        let who = match turn.speaker {
            Speaker::User => "you",
            Speaker::Companion => "emma",
        };
        say(&mut stdout, &format!("{}> {}", who, turn.content)).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Mood => match session.mood_insights() {
                Ok(insights) => {
                    say(&mut stdout, &insights.to_string()).await?;
                    if let Some(latest) = session.store().mood_history(1)?.first() {
                        say(&mut stdout, &format!("Latest check-in: {}", latest.notes)).await?;
                    }
                }
                Err(e) => {
                    logging::log_error(
                        Some(session.id()),
                        &format!("mood insights failed: {}", e),
                    );
                    say(&mut stdout, "Mood insights are unavailable right now.").await?;
                }
            },
            Command::Feeling(mood) => match feeling_prefill(&mood) {
                Some(text) => {
                    say(&mut stdout, &format!("you> {}", text)).await?;
                    send(&mut session, &mut stdout, text).await?;
                }
                None => say(&mut stdout, FEELING_USAGE).await?,
            },
            Command::Profile(profile) => {
                let resolved = profile.resolve();
                match session.update_profile(profile) {
                    Ok(()) => {
                        let saved = format!(
                            "Profile saved: {} ({})",
                            resolved.nickname,
                            resolved.age_group.as_str()
                        );
                        say(&mut stdout, &saved).await?;
                    }
                    Err(e) => {
                        logging::log_error(
                            Some(session.id()),
                            &format!("profile update failed: {}", e),
                        );
                        say(&mut stdout, "Could not save your profile.").await?;
                    }
                }
            }
            Command::Usage(usage) => say(&mut stdout, usage).await?,
            Command::Message(text) => send(&mut session, &mut stdout, &text).await?,
        }
    }

    logging::log_conversation(Some(session.id()), "session ended");
    Ok(())
}

/// Entry point for the `emma` binary: a line-based chat on stdin/stdout.
pub fn run() -> error::Result<()> {
    let config = Config::from_env()?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    if let Err(e) = logging::cleanup_old_logs(&config.log_dir) {
        logging::log_error(None, &format!("log cleanup failed: {}", e));
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(chat_loop(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command(" /quit "), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/mood"), Command::Mood);
        assert_eq!(parse_command("/feeling Sad"), Command::Feeling("sad".to_string()));
        assert_eq!(parse_command("/feeling"), Command::Usage(FEELING_USAGE));
        assert_eq!(
            parse_command("/profile Alex Senior"),
            Command::Profile(UserProfile::new("Alex", AgeGroup::Senior))
        );
        assert_eq!(parse_command("/profile Alex toddler"), Command::Usage(PROFILE_USAGE));
        assert_eq!(
            parse_command("  feeling a bit off  "),
            Command::Message("feeling a bit off".to_string())
        );
    }

    #[test]
    fn test_feeling_prefill_uses_picker_buckets() {
        assert_eq!(feeling_prefill("sad"), prompts::suggested_message_for("sad"));
        assert_eq!(feeling_prefill("lonely"), prompts::suggested_message_for("sad"));
        assert_eq!(feeling_prefill("angry"), prompts::suggested_message_for("stressed"));
        assert!(feeling_prefill("excited").unwrap().contains("excitement"));
        assert_eq!(feeling_prefill("crisis"), None);
        assert_eq!(feeling_prefill("bored"), None);
    }

    #[test]
    fn test_reply_line_shows_category_and_bucket() {
        let reply = ChatReply {
            text: "Deep breaths.".to_string(),
            category: ResponseCategory::Advice,
            emotion: EmotionLabel::Anxious,
        };
        assert_eq!(reply_line(&reply), "emma [advice | stressed]> Deep breaths.");
    }

    #[test]
    fn test_seed_profile_saved_on_first_run() {
        let db = Database::open_in_memory().unwrap();
        let seed = UserProfile::new("Sam", AgeGroup::Teen);
        assert_eq!(load_profile(&db, &seed).unwrap(), seed);
        assert_eq!(db.load_profile().unwrap(), Some(seed));
    }

    #[test]
    fn test_explicit_seed_updates_stored_profile() {
        let db = Database::open_in_memory().unwrap();
        load_profile(&db, &UserProfile::new("Sam", AgeGroup::Teen)).unwrap();

        let second = load_profile(&db, &UserProfile::new("Alex", AgeGroup::Senior)).unwrap();
        assert_eq!(second.nickname.as_deref(), Some("Alex"));
        assert_eq!(second.age_group.as_deref(), Some("senior"));
        assert_eq!(db.load_profile().unwrap(), Some(second));
    }

    #[test]
    fn test_unset_seed_keeps_stored_profile() {
        let db = Database::open_in_memory().unwrap();
        load_profile(&db, &UserProfile::new("Sam", AgeGroup::Teen)).unwrap();

        let loaded = load_profile(&db, &UserProfile::default()).unwrap();
        assert_eq!(loaded, UserProfile::new("Sam", AgeGroup::Teen));
    }
}
