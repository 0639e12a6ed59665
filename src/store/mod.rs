pub mod cache;
pub mod session;

mod macros;

pub use cache::CacheKey;
pub use cache::CacheSweeperHandle;
pub use cache::ResponseCache;
pub use session::{ExclusionStore, InMemoryExclusionStore};

#[cfg(test)]
pub use session::MockExclusionStore;
