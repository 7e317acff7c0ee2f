//! Command implementations

pub mod features;
pub mod init;
pub mod load;
pub mod summary;
