mod error;
mod route_client;
mod route_selector;

pub use error::*;
pub use route_client::*;
pub use route_selector::*;
