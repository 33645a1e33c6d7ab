pub mod aggregate;
pub mod expiry;
