// Library crate for alluxio-template: a path-oriented facade over a distributed
// file system client, plus the bundled local client used by the demo binary.

pub mod client;
pub mod config;
pub mod consts;
pub mod error;
pub mod logging;
pub mod template;
pub mod uri;
pub mod util;

pub use client::{Connect, FileSystem, LocalFileSystem};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use template::{AlluxioTemplate, write_large_file_local};
pub use uri::AlluxioUri;
