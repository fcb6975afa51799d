pub mod traits;

// Price API implementations
pub mod http;
