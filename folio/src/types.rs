//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases so signatures say which table an ID belongs to:
//!
//! - [`UserId`]: Admin account identifier
//! - [`ProjectId`], [`TestimonialId`], [`BlogId`]: Public content rows
//! - [`InquiryId`], [`SubscriberId`]: Form submission rows

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ProjectId = Uuid;
pub type TestimonialId = Uuid;
pub type BlogId = Uuid;
pub type InquiryId = Uuid;
pub type SubscriberId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// What a caller was trying to do when an authorization check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Any write or read behind the admin surface
    Manage,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Manage => f.write_str("manage"),
        }
    }
}
