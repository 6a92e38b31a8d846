// handlers/protected/mod.rs - Protected handlers (credential required)
//
// Routed behind middleware::require_login; standup create/edit additionally
// behind middleware::require_admin. Every upstream call passes the visitor's
// credential to the gateway, which may refresh it in place.

pub mod dashboard;
pub mod session;
pub mod standup;

pub use dashboard::dashboard;
pub use session::{create_session, submit_response, view_session};
pub use standup::{create_standup, edit_standup, edit_standup_page, new_standup_page, view_standup};
