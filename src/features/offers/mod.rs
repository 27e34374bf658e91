//! Offers (job requests).
//!
//! Providers bid on open jobs in their trade; the homeowner accepts one
//! bid, which assigns the job and rejects every other pending bid in the
//! same transaction.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/jobs/{id}/offers` | Provider | Make an offer on an open job |
//! | GET | `/api/jobs/{id}/offers` | Owner/Admin | Offers on a job with provider details |
//! | GET | `/api/offers/mine` | Provider | Caller's offers with a job summary |
//! | POST | `/api/offers/{id}/accept` | Owner | Accept an offer |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::OfferService;
