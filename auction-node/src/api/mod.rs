pub mod rest;

pub use rest::{router, start_rest_api, AppState};
