pub mod mcq_repository;
pub mod mcq_response_repository;
pub mod user_repository;

pub use mcq_repository::{McqRepository, MongoMcqRepository};
pub use mcq_response_repository::{McqResponseRepository, MongoMcqResponseRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
