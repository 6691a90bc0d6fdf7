//! Well-known constants shared by the facade and the bundled clients.

/// Placement sentinel: let the client pick a worker (local worker first).
pub const NON_SPECIFIED_WORKER: &str = "LocalFirst";

/// Placement sentinel: pick the worker with the most available capacity.
pub const MOST_AVAILABLE_FIRST: &str = "MostAvailableFirst";

/// Default master RPC port.
pub const ALLUXIO_PORT: u16 = 19998;

pub const ALLUXIO_PREFIX: &str = "alluxio://";

pub const MIB: u64 = 1024 * 1024;

/// Default block size for newly created files.
pub const DEFAULT_BLOCK_SIZE_BYTES: u64 = 512 * MIB;

/// Chunk size used by the read helper.
pub const READ_BUFFER_SIZE: usize = 10_000_000;
