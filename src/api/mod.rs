pub mod gateway;
pub mod models;
pub mod request;
pub mod result;

pub use gateway::{Gateway, REFRESH_PATH};
pub use request::{ApiMethod, ApiRequest, RequestBody};
pub use result::{ApiResult, Outcome, ResponseBody, TransportError, TransportErrorKind};
