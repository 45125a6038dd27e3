pub mod config;
pub mod load;
