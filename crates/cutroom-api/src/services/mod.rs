//! Business logic services.

pub mod invites;
pub mod review;

pub use invites::InviteService;
pub use review::{ReviewService, SubmitDraft};
