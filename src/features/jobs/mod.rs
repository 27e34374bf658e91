//! Jobs posted by homeowners.
//!
//! Posting is rate limited per homeowner: at most `JOB_RATE_LIMIT_MAX` open
//! jobs created within `JOB_RATE_LIMIT_WINDOW_HOURS`. Status changes follow
//! [`models::JobStatus`]'s transition table; `assigned` is only reachable by
//! accepting an offer.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/jobs` | Homeowner | Post a job |
//! | GET | `/api/jobs/mine` | Homeowner | Jobs posted by the caller |
//! | GET | `/api/jobs/open` | Provider | Open jobs in the provider's category |
//! | GET | `/api/jobs/assigned` | Provider | Jobs the provider is working on |
//! | GET | `/api/jobs/{id}` | Yes | Get a job |
//! | PUT | `/api/jobs/{id}` | Homeowner | Edit an open job |
//! | DELETE | `/api/jobs/{id}` | Owner or admin | Delete a job |
//! | PATCH | `/api/jobs/{id}/status` | Owner, assigned provider or admin | Change status |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::JobService;
