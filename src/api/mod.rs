pub mod data;
pub mod errors;
pub mod views;
