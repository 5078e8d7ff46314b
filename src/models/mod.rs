pub mod rent;
pub mod scheduled_job;
pub mod storage;
pub mod storage_box;
pub mod user;
