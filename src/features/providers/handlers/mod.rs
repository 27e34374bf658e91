mod provider_handler;

pub use provider_handler::{
    __path_get_my_profile, __path_get_provider, __path_search_providers,
    __path_update_my_profile, __path_upload_profile_image, get_my_profile, get_provider,
    search_providers, update_my_profile, upload_profile_image,
};
