pub mod mcq;
pub mod mcq_response;
pub mod user;
pub use mcq::{Mcq, NewMcq};
pub use mcq_response::McqResponse;
pub use user::{Role, User};
