pub mod chat;
pub mod profile;
pub mod progress;
pub mod quiz;
pub mod simulator;
