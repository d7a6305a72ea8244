pub mod connection;
pub mod error;
pub mod job_repository;
pub mod models;
