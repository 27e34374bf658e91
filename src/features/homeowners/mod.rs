//! Homeowner settings.
//!
//! Name, phone, city and profile picture of a homeowner. The row is seeded
//! with the name given at sign-up and created on first save otherwise.
//! Pictures share the `profile_pictures/{user_id}/` layout with providers.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/homeowners/me` | Homeowner | Own settings |
//! | PUT | `/api/homeowners/me` | Homeowner | Update name, phone and city |
//! | POST | `/api/homeowners/me/image` | Homeowner | Upload profile picture |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::HomeownerService;
