pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod governor;
pub mod handlers;
pub mod middleware;
pub mod state;

// In-memory store implementations shared by unit tests, integration tests,
// and local development without Postgres.
pub mod testing;
