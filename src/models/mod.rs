//! Data models representing database entities and their API shapes.

/// Financial account model
pub mod account;
/// Budget model and alert types
pub mod budget;
/// Invoice and line-item models
pub mod invoice;
/// Income/expense transaction model
pub mod transaction;
/// User, session and password-reset models
pub mod user;
