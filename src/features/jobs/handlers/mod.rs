mod job_handler;

pub use job_handler::{
    __path_create_job, __path_delete_job, __path_get_job, __path_list_assigned_jobs,
    __path_list_my_jobs, __path_list_open_jobs, __path_update_job, __path_update_job_status,
    create_job, delete_job, get_job, list_assigned_jobs, list_my_jobs, list_open_jobs,
    update_job, update_job_status,
};
