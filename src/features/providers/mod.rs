//! Service-provider profiles.
//!
//! A profile is created at provider sign-up and edited from the settings
//! screen. Discovery matches providers by skill category id and decorates
//! each card with a rating summary from one batched aggregate query.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/providers` | Yes | Search providers by category and city |
//! | GET | `/api/providers/{user_id}` | Yes | Profile, rating summary and reviews |
//! | GET | `/api/providers/me` | Provider | Own profile |
//! | PUT | `/api/providers/me` | Provider | Update own profile |
//! | POST | `/api/providers/me/image` | Provider | Upload profile picture |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::ProviderService;
