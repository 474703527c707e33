// Adapters layer: concrete MarkRepository implementations.

pub mod http;
pub mod memory;

pub use http::HttpMarkRepository;
pub use memory::InMemoryMarkRepository;
