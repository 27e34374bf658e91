mod offer_repository;

pub use offer_repository::{OfferRepository, PgOfferRepository};
