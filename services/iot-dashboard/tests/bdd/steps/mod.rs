//! BDD step definitions for the IoT dashboard

pub mod alert_steps;
pub mod device_steps;
pub mod home_steps;
pub mod session_steps;
