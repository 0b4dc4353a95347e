pub mod memory;
pub mod models;
pub mod order_repo;
pub mod user_repo;

pub use memory::{InMemoryOrderRepository, InMemoryUserRepository};
pub use order_repo::DieselOrderRepository;
pub use user_repo::DieselUserRepository;
