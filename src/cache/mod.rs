//! Page accounting: the shared buffer core plus its two specializations.

pub mod buffer;
pub mod lru;
pub mod page;
pub mod prefetch;

pub use buffer::PageBuffer;
pub use lru::LruBuffer;
pub use page::Page;
pub use prefetch::PrefetchBuffer;
