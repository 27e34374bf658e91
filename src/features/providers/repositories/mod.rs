mod provider_profile_repository;

pub use provider_profile_repository::{PgProviderProfileRepository, ProviderProfileRepository};
