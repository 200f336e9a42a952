pub mod cached;
pub mod memory;
pub mod user;

pub use cached::CachedUserRepository;
pub use memory::InMemoryUserRepository;
pub use user::PostgresUserRepository;
