//! Service categories shared by jobs and provider profiles.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | List categories |
//! | GET | `/api/categories/{id}` | No | Get a category |
//!
//! Creation and deletion are admin operations, routed under `/api/admin/categories`.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::CategoryService;
