mod rating_repository;

pub use rating_repository::{PgRatingRepository, RatingRepository};
