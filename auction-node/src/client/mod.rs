pub mod http;

pub use http::HttpEndpoint;
