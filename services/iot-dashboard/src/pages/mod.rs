//! Page controllers
//!
//! Each page loads its own data through the backend client, keeps its
//! loading/error/form state, and is rendered by the matching `views` module.
//! Pages never share state with each other; every request re-fetches.

pub mod admin;
pub mod alerts;
pub mod auth;
pub mod device_form;
pub mod devices;
pub mod home;
pub mod profile;
pub mod readings;

/// Result of submitting a form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<P> {
    /// The mutation succeeded; continue at this route
    Navigate(String),
    /// Show the page again, typically with an inline error
    Rerender(P),
}
