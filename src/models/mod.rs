pub mod interval;
pub mod ride;
pub mod search;
pub mod user;
