//! Client seam
//!
//! `FileSystem` is the wrapped distributed file system client. The facade in
//! `crate::template` only ever talks to this trait, so any concrete client can
//! be plugged in. `LocalFileSystem` is the bundled single-node client backed by
//! a local directory.
//!
//! Submodules:
//! - `options`: per-operation option bundles and write/read types
//! - `policy`: worker placement policies
//! - `status`: file/directory metadata
//! - `local`: local-directory client

pub mod local;
pub mod options;
pub mod policy;
pub mod status;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::uri::AlluxioUri;

pub use local::LocalFileSystem;
pub use options::*;
pub use policy::{LocationPolicy, resolve_location_policy};
pub use status::UriStatus;

/// Output stream of a newly created file; released when dropped.
pub type FileOutStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Input stream of an opened file; released when dropped.
pub type FileInStream = Box<dyn AsyncRead + Send + Unpin>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn create_directory(
        &self,
        path: &AlluxioUri,
        options: CreateDirectoryOptions,
    ) -> Result<()>;

    async fn create_file(
        &self,
        path: &AlluxioUri,
        options: CreateFileOptions,
    ) -> Result<FileOutStream>;

    async fn delete(&self, path: &AlluxioUri, options: DeleteOptions) -> Result<()>;

    async fn exists(&self, path: &AlluxioUri, options: ExistsOptions) -> Result<bool>;

    async fn free(&self, path: &AlluxioUri, options: FreeOptions) -> Result<()>;

    async fn get_status(&self, path: &AlluxioUri, options: GetStatusOptions)
    -> Result<UriStatus>;

    async fn list_status(
        &self,
        path: &AlluxioUri,
        options: ListStatusOptions,
    ) -> Result<Vec<UriStatus>>;

    async fn load_metadata(&self, path: &AlluxioUri, options: LoadMetadataOptions)
    -> Result<()>;

    async fn mount(
        &self,
        alluxio_path: &AlluxioUri,
        ufs_path: &AlluxioUri,
        options: MountOptions,
    ) -> Result<()>;

    async fn open_file(&self, path: &AlluxioUri, options: OpenFileOptions)
    -> Result<FileInStream>;

    async fn rename(&self, src: &AlluxioUri, dst: &AlluxioUri, options: RenameOptions)
    -> Result<()>;

    async fn set_attribute(&self, path: &AlluxioUri, options: SetAttributeOptions)
    -> Result<()>;

    async fn unmount(&self, path: &AlluxioUri, options: UnmountOptions) -> Result<()>;
}

/// Clients that can establish their own connection from configuration.
#[async_trait]
pub trait Connect: FileSystem + Sized {
    async fn connect(config: &ClientConfig) -> Result<Self>;
}
