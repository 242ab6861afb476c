//! Request handlers, one module per resource

pub mod health;
pub mod users;
pub mod groups;
pub mod bills;
pub mod payments;
pub mod expenses;
