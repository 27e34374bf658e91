mod offer;

pub use offer::{AcceptedOffer, NewOffer, Offer, OfferStatus};
