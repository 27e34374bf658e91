pub mod accounts;
pub mod admin;
pub mod auth;
pub mod categories;
pub mod homeowners;
pub mod jobs;
pub mod offers;
pub mod providers;
pub mod ratings;
pub mod roles;
