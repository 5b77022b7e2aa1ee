pub mod core;
pub mod lock;
pub mod signature;
