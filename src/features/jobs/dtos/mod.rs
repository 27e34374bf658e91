mod job_dto;

pub use job_dto::{JobFieldsDto, JobResponseDto, UpdateJobStatusDto};
