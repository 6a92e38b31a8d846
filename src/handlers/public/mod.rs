// handlers/public/mod.rs - Public handlers (no credential required)
//
// Landing page, health check, and the login / registration / logout flows.

pub mod auth;
pub mod home;

pub use auth::{login, login_page, logout, register, register_page};
pub use home::{health, index};
