mod provider_service;

pub use provider_service::ProviderService;
