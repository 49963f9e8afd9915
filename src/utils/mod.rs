//! Utility modules shared by the binary and the library.

pub mod logger;
