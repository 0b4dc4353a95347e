pub mod access;
pub mod aggregate;
pub mod errors;
pub mod lifecycle;
pub mod order;
pub mod ports;
pub mod principal;
pub mod stats;
