//! Group Domain
//!
//! Groups scope shared bills. Each group has one admin and any number of
//! members; the admin and the members together are the participants who
//! share a group bill.
//!
//! # Membership Rules
//!
//! - The creator becomes the admin
//! - A user is added at most once; adding the admin or an existing member
//!   is a conflict
//! - Users are named by id, email or name, in that precedence
//! - Groups are only removed by explicit deletion

pub mod group;
pub mod ports;
pub mod service;
pub mod error;

pub use group::{Group, MemberSummary};
pub use ports::GroupPort;
pub use service::{GroupService, GroupUpdate};
pub use error::GroupError;
