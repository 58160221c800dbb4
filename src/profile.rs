use serde::{Deserialize, Serialize};

/// Nickname used when the profile has none.
pub const DEFAULT_NICKNAME: &str = "sweetheart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Child,
    Teen,
    #[default]
    Adult,
    Midlife,
    Senior,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Child => "child",
            AgeGroup::Teen => "teen",
            AgeGroup::Adult => "adult",
            AgeGroup::Midlife => "midlife",
            AgeGroup::Senior => "senior",
        }
    }

    pub fn from_str(s: &str) -> Option<AgeGroup> {
        match s.trim().to_lowercase().as_str() {
            "child" => Some(AgeGroup::Child),
            "teen" => Some(AgeGroup::Teen),
            "adult" => Some(AgeGroup::Adult),
            "midlife" => Some(AgeGroup::Midlife),
            "senior" => Some(AgeGroup::Senior),
            _ => None,
        }
    }
}

/// Profile as supplied by the caller. Both fields may be absent or junk;
/// call [`UserProfile::resolve`] once before using them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub nickname: Option<String>,
    /// Raw age group as entered (e.g. "teen"). Kept as a string so that
    /// unknown values from older clients still deserialize.
    #[serde(default)]
    pub age_group: Option<String>,
}

/// Profile with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub nickname: String,
    pub age_group: AgeGroup,
}

impl UserProfile {
    pub fn new(nickname: impl Into<String>, age_group: AgeGroup) -> Self {
        Self {
            nickname: Some(nickname.into()),
            age_group: Some(age_group.as_str().to_string()),
        }
    }

    /// This profile with every field `overrides` sets replaced.
    pub fn overridden_by(&self, overrides: &UserProfile) -> UserProfile {
        UserProfile {
            nickname: overrides.nickname.clone().or_else(|| self.nickname.clone()),
            age_group: overrides.age_group.clone().or_else(|| self.age_group.clone()),
        }
    }

    pub fn resolve(&self) -> ResolvedProfile {
        let nickname = self
            .nickname
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NICKNAME)
            .to_string();

        let age_group = self
            .age_group
            .as_deref()
            .and_then(AgeGroup::from_str)
            .unwrap_or_default();

        ResolvedProfile { nickname, age_group }
    }
}
