pub mod operations;
pub mod sync;
pub mod transport;
