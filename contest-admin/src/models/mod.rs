//! Domain models for contest data and bulk imports

pub mod import;
pub mod result;
pub mod session;
pub mod team;

pub use import::{EntityKind, ImportSummary, RowError};
pub use result::{ResultRecord, StoredResult};
pub use session::{Session, SessionId};
pub use team::{MemberRecord, StoredTeam, TeamRecord, TeamStatus, DEFAULT_MEMBER_ROLE};
