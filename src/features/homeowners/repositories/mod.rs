mod homeowner_profile_repository;

pub use homeowner_profile_repository::{
    HomeownerProfileRepository, PgHomeownerProfileRepository,
};
