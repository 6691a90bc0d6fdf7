//! Per-operation option bundles. `Default` gives the documented defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::client::policy::LocationPolicy;
use crate::consts::DEFAULT_BLOCK_SIZE_BYTES;
use crate::error::Error;

/// Where written data lands: the cache tier, the under storage, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteType {
    #[default]
    MustCache,
    TryCache,
    CacheThrough,
    Through,
    AsyncThrough,
    None,
}

impl WriteType {
    pub fn is_cache(self) -> bool {
        matches!(
            self,
            WriteType::MustCache
                | WriteType::TryCache
                | WriteType::CacheThrough
                | WriteType::AsyncThrough
        )
    }

    pub fn is_through(self) -> bool {
        matches!(self, WriteType::CacheThrough | WriteType::Through)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteType::MustCache => "MUST_CACHE",
            WriteType::TryCache => "TRY_CACHE",
            WriteType::CacheThrough => "CACHE_THROUGH",
            WriteType::Through => "THROUGH",
            WriteType::AsyncThrough => "ASYNC_THROUGH",
            WriteType::None => "NONE",
        }
    }
}

impl fmt::Display for WriteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "MUST_CACHE" => Ok(WriteType::MustCache),
            "TRY_CACHE" => Ok(WriteType::TryCache),
            "CACHE_THROUGH" => Ok(WriteType::CacheThrough),
            "THROUGH" => Ok(WriteType::Through),
            "ASYNC_THROUGH" => Ok(WriteType::AsyncThrough),
            "NONE" => Ok(WriteType::None),
            _ => Err(Error::InvalidArgument(format!("unknown write type `{s}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadType {
    NoCache,
    Cache,
    #[default]
    CachePromote,
}

impl ReadType {
    pub fn is_cache(self) -> bool {
        !matches!(self, ReadType::NoCache)
    }

    pub fn is_promote(self) -> bool {
        matches!(self, ReadType::CachePromote)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadType::NoCache => "NO_CACHE",
            ReadType::Cache => "CACHE",
            ReadType::CachePromote => "CACHE_PROMOTE",
        }
    }
}

impl fmt::Display for ReadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NO_CACHE" => Ok(ReadType::NoCache),
            "CACHE" => Ok(ReadType::Cache),
            "CACHE_PROMOTE" => Ok(ReadType::CachePromote),
            _ => Err(Error::InvalidArgument(format!("unknown read type `{s}`"))),
        }
    }
}

/// When metadata should be pulled from the under storage on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMetadataType {
    Never,
    #[default]
    Once,
    Always,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFileOptions {
    pub recursive: bool,
    pub block_size_bytes: u64,
    pub write_type: WriteType,
    pub location_policy: Option<LocationPolicy>,
    pub ttl: Option<Duration>,
    pub mode: Option<u32>,
}

impl Default for CreateFileOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            block_size_bytes: DEFAULT_BLOCK_SIZE_BYTES,
            write_type: WriteType::default(),
            location_policy: None,
            ttl: None,
            mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateDirectoryOptions {
    pub recursive: bool,
    /// Succeed quietly when the directory is already there.
    pub allow_exists: bool,
    pub write_type: WriteType,
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeleteOptions {
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExistsOptions {
    pub load_metadata_type: LoadMetadataType,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FreeOptions {
    pub recursive: bool,
    /// Free pinned data too.
    pub forced: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetStatusOptions {
    pub load_metadata_type: LoadMetadataType,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListStatusOptions {
    pub load_metadata_type: LoadMetadataType,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadMetadataOptions {
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MountOptions {
    pub read_only: bool,
    pub shared: bool,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenFileOptions {
    pub read_type: ReadType,
    pub location_policy: Option<LocationPolicy>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenameOptions {}

/// Attribute updates; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetAttributeOptions {
    pub pinned: Option<bool>,
    pub ttl: Option<Duration>,
    pub persisted: Option<bool>,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Option<u32>,
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnmountOptions {}
