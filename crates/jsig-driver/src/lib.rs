//! Jsig driver library: filesystem header loading and the stderr logger
//! used by the `jsig` binary.

pub mod header_loader;
pub mod logger;

pub use header_loader::FsHeaderLoader;
