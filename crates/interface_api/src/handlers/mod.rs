//! Request handlers

pub mod auth;
pub mod graphics;
pub mod health;
pub mod producer;
