mod identity_client;

pub use identity_client::{
    GoTrueClient, IdentityDeletion, IdentityProvider, IdentitySession, IdentityUser, SignUpOutcome,
};
