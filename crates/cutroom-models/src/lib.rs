//! Shared data models for the CutRoom backend.
//!
//! This crate provides Serde-serializable types for:
//! - Accounts and roles
//! - Editor invites and their lifecycle
//! - Videos and review status transitions
//! - Invite token generation

pub mod account;
pub mod ids;
pub mod invite;
pub mod video;

// Re-export common types
pub use account::{normalize_email, Account, Role};
pub use ids::{AccountId, InviteId, VideoId};
pub use invite::{
    generate_invite_token, is_valid_invite_token, CreateInviteRequest, Invite, InviteResponse,
    InviteStatus, ResolveInviteResponse,
};
pub use video::{BlobLocator, ReviewStatus, Video};
