mod homeowner_handler;

pub use homeowner_handler::{
    __path_get_my_settings, __path_update_my_settings, __path_upload_my_image, get_my_settings,
    update_my_settings, upload_my_image,
};
