pub mod analyze;
pub mod compare;
pub mod config;
pub mod replay;
pub mod validate;
