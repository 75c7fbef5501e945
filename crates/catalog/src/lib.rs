//! Seis Lab Data catalog library.
//!
//! Filtering, pagination and query layer for the survey catalog. The
//! `seislab-catalog` binary serves it over HTTP; the library is exposed for
//! integration testing.

pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod query;
pub mod routes;
pub mod state;
