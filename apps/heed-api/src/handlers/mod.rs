//! HTTP handlers

pub mod error;
pub mod likes;
pub mod media;
pub mod posts;
