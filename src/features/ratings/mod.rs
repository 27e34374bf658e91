//! Provider ratings.
//!
//! A homeowner rates the assigned provider once per completed job; the
//! unique index on `provider_ratings.job_id` rejects a second rating even
//! when two submissions race. Averages are recomputed on every read.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/ratings` | Homeowner | Rate the provider of a completed job |
//! | GET | `/api/ratings/providers/{provider_id}` | Yes | Rating summary and reviews |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::RatingService;
