pub mod operations;
pub mod strategy;
