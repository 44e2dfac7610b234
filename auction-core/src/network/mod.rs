pub mod error;
pub mod http;
pub mod in_memory;
pub mod retry;
pub mod traits;
