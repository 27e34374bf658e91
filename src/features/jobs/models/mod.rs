mod job;

pub use job::{Job, JobChanges, JobStatus, NewJob};
