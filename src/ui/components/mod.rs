pub mod chart;
pub mod chat;
pub mod dashboard;
pub mod feedback;
pub mod login;
pub mod profile;
pub mod progress_bar;
pub mod progress_view;
pub mod quiz;
pub mod sidebar;
pub mod simulator;
pub mod text_field;
