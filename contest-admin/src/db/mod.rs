//! Data access for the admin service
//!
//! Connection setup and schema live in `contest_common::db`; this module
//! holds the queries the service issues.

pub mod admins;
pub mod results;
pub mod sessions;
pub mod teams;
