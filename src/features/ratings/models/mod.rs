mod rating;

pub use rating::{NewRating, ProviderRating, RatingStats, RatingSummary};
