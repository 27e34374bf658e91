mod provider_profile;

pub use provider_profile::{
    NewProviderProfile, ProviderProfile, ProviderProfileChanges, ProviderSearch,
};
