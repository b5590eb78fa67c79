pub mod auth;
pub mod characters;
pub mod config;
pub mod logs;
pub mod raids;
pub mod roster;
pub mod session;
pub mod signups;
