//! Team and member records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SessionId;

/// Role given to members whose role cell is missing or blank
pub const DEFAULT_MEMBER_ROLE: &str = "Contestant";

/// Team member; owned by its team, no identity of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub role: String,
}

impl MemberRecord {
    pub fn new(name: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            name: name.into(),
            role: role.unwrap_or(DEFAULT_MEMBER_ROLE).to_string(),
        }
    }
}

/// Selection status of a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    #[default]
    Selected,
    Qualified,
    Disqualified,
    Withdrawn,
}

impl TeamStatus {
    pub const ALL: [TeamStatus; 4] = [
        TeamStatus::Selected,
        TeamStatus::Qualified,
        TeamStatus::Disqualified,
        TeamStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Selected => "selected",
            TeamStatus::Qualified => "qualified",
            TeamStatus::Disqualified => "disqualified",
            TeamStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamStatus {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TeamStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown team status '{}'", s.trim()))
    }
}

/// A team ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub session_id: SessionId,
    pub team_name: String,
    pub institution: Option<String>,
    /// Non-empty; order follows the source cell
    pub members: Vec<MemberRecord>,
    pub status: TeamStatus,
    pub display_order: Option<i64>,
    pub selected_from: Option<String>,
    pub awc_venue: Option<String>,
}

/// Team as read back from the store
#[derive(Debug, Clone, Serialize)]
pub struct StoredTeam {
    pub id: i64,
    #[serde(flatten)]
    pub team: TeamRecord,
}
