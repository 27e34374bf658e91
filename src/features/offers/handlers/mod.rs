mod offer_handler;

pub use offer_handler::{
    __path_accept_offer, __path_list_job_offers, __path_list_my_offers, __path_submit_offer,
    accept_offer, list_job_offers, list_my_offers, submit_offer,
};
