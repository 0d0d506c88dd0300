//! Authentication primitives: JWT issuing/validation and password hashing.

pub mod jwt;
pub mod password;
