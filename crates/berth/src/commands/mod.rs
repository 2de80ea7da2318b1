//! Command implementations that are more than a thin storage call.

pub mod init;
