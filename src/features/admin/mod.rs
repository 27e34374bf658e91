//! Admin moderation.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/users` | Users with roles and provider names |
//! | PUT | `/api/admin/users/{id}/role` | Change a user's role |
//! | DELETE | `/api/admin/users/{id}` | Delete a user (account deletion) |
//! | GET | `/api/admin/jobs` | All jobs, paginated |
//! | PATCH | `/api/admin/jobs/{id}/status` | Change a job's status |
//! | DELETE | `/api/admin/jobs/{id}` | Delete a job |
//! | POST | `/api/admin/categories` | Create a category |
//! | DELETE | `/api/admin/categories/{id}` | Delete an unused category |
//! | GET | `/api/admin/stats` | Dashboard counters |
//!
//! Every route requires the `admin` role.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{AdminRepositories, AdminService};
