pub mod account_service;
pub mod mcq_service;
pub mod submission_gate;
