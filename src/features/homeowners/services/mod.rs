mod homeowner_service;

pub use homeowner_service::HomeownerService;
