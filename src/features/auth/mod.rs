//! Authentication.
//!
//! Accounts and sessions are owned by a GoTrue-compatible identity
//! service. Access tokens are verified locally (shared secret or JWKS) by
//! [`JwtValidator`]; the auth middleware then loads the caller's role and
//! attaches an [`model::AuthenticatedUser`] to the request.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/auth/signup/homeowner` | No | Register a homeowner |
//! | POST | `/api/auth/signup/provider` | No | Register a service provider |
//! | POST | `/api/auth/login` | No | Password sign-in |
//! | POST | `/api/auth/refresh` | No | Refresh a session |
//! | GET | `/api/auth/me` | Yes | Caller's id, email and role |
//! | POST | `/api/auth/logout` | Yes | Revoke the session |
//! | PUT | `/api/auth/password` | Yes | Change password |

mod jwks;
mod validator;

pub mod clients;
pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::AuthService;
pub use validator::JwtValidator;
