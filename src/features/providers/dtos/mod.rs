mod provider_dto;

pub use provider_dto::{
    ProviderDetailDto, ProviderProfileDto, ProviderSearchQuery, ProviderSummaryDto,
    UpdateProviderProfileDto, UploadProfileImageDto,
};
