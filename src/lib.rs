//! Data-access service for the tracker platform.
//!
//! Two cooperating pieces: [`query::QueryParams`] turns decoded HTTP
//! query parameters into typed pagination, sort, projection and filter
//! values, and [`repository::Repository`] executes them against
//! PostgreSQL with every value bound as a statement parameter.

pub mod app_state;
pub mod config;
pub mod errors;
pub mod http;
pub mod infra;
pub mod query;
pub mod repository;
pub mod schema;
pub mod telemetry;
