mod homeowner_dto;

pub use homeowner_dto::{HomeownerProfileDto, UpdateHomeownerProfileDto};
