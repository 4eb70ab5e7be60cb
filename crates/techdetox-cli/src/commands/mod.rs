pub mod config;
pub mod contact;
pub mod plan;
pub mod start;
pub mod unlock;
