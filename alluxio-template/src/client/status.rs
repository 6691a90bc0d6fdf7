use std::time::Duration;

/// Metadata of one file or directory as reported by the client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UriStatus {
    pub path: String,
    pub name: String,
    pub folder: bool,
    pub length: u64,
    pub block_size_bytes: u64,
    pub creation_time_ms: u64,
    pub last_modification_time_ms: u64,
    pub in_memory_percentage: u8,
    pub pinned: bool,
    pub persisted: bool,
    pub ttl: Option<Duration>,
    pub mode: u32,
    pub owner: String,
    pub group: String,
    pub mount_point: bool,
}

impl UriStatus {
    pub fn is_folder(&self) -> bool {
        self.folder
    }
}
