// Core messaging module - conversations and the send path.

pub mod messaging_models;
pub mod messaging_service;

pub use messaging_models::*;
pub use messaging_service::*;
