//! Request and response bodies

pub mod auth;
pub mod graphics;
pub mod producer;
