//! Domain model module declarations.

pub mod issue;
pub mod user;
