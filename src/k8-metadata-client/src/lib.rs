mod client;
mod in_memory;

pub use client::ObjectStore;
pub use client::Preconditions;
pub use client::UpdateFn;
pub use in_memory::InMemoryStore;

pub type SharedStore<C> = std::sync::Arc<C>;
