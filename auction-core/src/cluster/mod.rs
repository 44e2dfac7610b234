pub mod builder;
pub mod core;
pub mod endpoint;
pub mod node;
pub mod selector;
