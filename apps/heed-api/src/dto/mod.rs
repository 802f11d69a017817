//! Request and response bodies

pub mod posts;
