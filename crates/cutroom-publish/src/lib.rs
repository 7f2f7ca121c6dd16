//! Hosting platform upload client.
//!
//! Approved videos are pushed to the external hosting platform through the
//! [`PublishTarget`] trait. [`HostedPublisher`] is the HTTP implementation;
//! a failed or timed-out upload surfaces as a [`PublishError`] and never
//! mutates review state itself.

pub mod client;
pub mod error;
pub mod target;

pub use client::{HostedPublisher, PublisherConfig};
pub use error::{PublishError, PublishResult};
pub use target::{PublishReceipt, PublishRequest, PublishTarget};
