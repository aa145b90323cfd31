pub mod rides;
pub mod storage;
pub mod store;
pub mod users;
