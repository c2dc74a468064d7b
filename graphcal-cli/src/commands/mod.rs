pub mod config;
pub mod events;
pub mod find;
pub mod resolve;
pub mod zones;
