//! Domain services over [`ApiClient`](crate::http::ApiClient).
//!
//! Services shape requests and responses only. Failures are logged and
//! handed back unchanged; presenting them is the caller's business.

mod product;
mod user;

pub use product::{ProductService, ProductUpload, ProductView};
pub use user::{Credentials, RefreshOutcome, UserInfo, UserService};
