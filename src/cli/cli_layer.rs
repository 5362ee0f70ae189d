// Terminal layer - the message composer and its commands.

#[path = "commands.rs"]
pub mod commands;

#[path = "composer.rs"]
pub mod composer;

pub use composer::Composer;
