pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod program;
pub mod recommend;
pub mod reserve;
pub mod review;
pub mod reviews;
