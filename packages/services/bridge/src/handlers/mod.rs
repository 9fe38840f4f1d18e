//! HTTP 핸들러

pub mod emails;
pub mod health;
pub mod objects;
