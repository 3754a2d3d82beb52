pub mod database;
pub mod storage_sqllite;
