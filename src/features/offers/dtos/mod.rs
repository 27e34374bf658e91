mod offer_dto;

pub use offer_dto::{
    AcceptedOfferDto, JobOfferDto, MyOfferDto, OfferJobSummaryDto, OfferProviderDto,
    OfferResponseDto, SubmitOfferDto,
};
