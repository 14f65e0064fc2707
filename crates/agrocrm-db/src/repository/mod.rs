//! SurrealDB repository implementations.

mod customer;
mod user;

pub use customer::SurrealCustomerRepository;
pub use user::SurrealUserRepository;
