mod rating_handler;

pub use rating_handler::{
    __path_get_provider_ratings, __path_submit_rating, get_provider_ratings, submit_rating,
};
