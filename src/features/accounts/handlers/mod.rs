mod account_handler;

pub use account_handler::{__path_delete_account, delete_account};
