mod auth_handler;

pub use auth_handler::{
    __path_change_password, __path_get_me, __path_login, __path_logout, __path_refresh_token,
    __path_sign_up_homeowner, __path_sign_up_provider, change_password, get_me, login, logout,
    refresh_token, sign_up_homeowner, sign_up_provider,
};
