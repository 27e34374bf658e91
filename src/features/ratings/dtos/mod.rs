mod rating_dto;

pub use rating_dto::{ProviderRatingsDto, RatingResponseDto, SubmitRatingDto};
