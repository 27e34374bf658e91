mod homeowner_profile;

pub use homeowner_profile::{HomeownerProfile, HomeownerProfileChanges};
