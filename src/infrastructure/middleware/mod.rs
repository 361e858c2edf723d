// Request middleware - viewer resolution and response caching

pub mod page_cache_middleware;
pub mod viewer_context_extractor;
pub mod viewer_context_middleware;

pub use page_cache_middleware::{page_cache_key, page_cache_middleware};
pub use viewer_context_extractor::Vc;
pub use viewer_context_middleware::{extract_session, viewer_context_middleware, SessionSource};
