pub mod guard;

pub use guard::{check_access, require_admin, require_login, Access};
