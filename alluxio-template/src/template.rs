//! `AlluxioTemplate`: path-oriented facade over a [`FileSystem`] client.
//!
//! Every operation builds the `AlluxioUri`s it needs, forwards the call to the
//! client and hands back the client's result untouched. Failures go through
//! [`report`] exactly once before being returned to the caller.

use std::future::Future;
use std::io;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

use crate::client::{
    Connect, CreateDirectoryOptions, CreateFileOptions, DeleteOptions, ExistsOptions,
    FileInStream, FileOutStream, FileSystem, FreeOptions, GetStatusOptions, ListStatusOptions,
    LoadMetadataOptions, MountOptions, OpenFileOptions, ReadType, RenameOptions,
    SetAttributeOptions, UnmountOptions, UriStatus, WriteType, resolve_location_policy,
};
use crate::config::ClientConfig;
use crate::consts::{MIB, NON_SPECIFIED_WORKER, READ_BUFFER_SIZE};
use crate::error::{Error, Result, report};
use crate::uri::AlluxioUri;
use crate::util::{Stopwatch, utf8_len_str};

pub struct AlluxioTemplate<F> {
    fs: F,
    config: ClientConfig,
}

impl<F: Connect> AlluxioTemplate<F> {
    /// Connects using the ambient configuration (`ALLUXIO_*` environment).
    pub async fn connect() -> Result<Self> {
        Self::connect_with(ClientConfig::from_env()?).await
    }

    pub async fn connect_with(config: ClientConfig) -> Result<Self> {
        tracing::debug!("Connecting to master {}", config.master_address());
        let fs = F::connect(&config).await.inspect_err(|e| {
            report(e);
        })?;
        Ok(Self { fs, config })
    }

    /// Connects to the master named by `master_location`, e.g.
    /// `alluxio://localhost:19998`. Only the host is taken from it.
    pub async fn with_master(master_location: &str) -> Result<Self> {
        Self::with_master_config(master_location, ClientConfig::from_env()?).await
    }

    pub async fn with_master_config(master_location: &str, mut config: ClientConfig) -> Result<Self> {
        let uri = AlluxioUri::new(master_location);
        let host = uri.host().ok_or_else(|| {
            Error::InvalidArgument(format!("master location `{master_location}` has no host"))
        })?;
        config.master_hostname = host.to_string();
        Self::connect_with(config).await
    }
}

impl<F: FileSystem> AlluxioTemplate<F> {
    pub fn from_client(fs: F) -> Self {
        Self::from_parts(fs, ClientConfig::default())
    }

    pub fn from_parts(fs: F, config: ClientConfig) -> Self {
        Self { fs, config }
    }

    pub fn client(&self) -> &F {
        &self.fs
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs `action` against the client. A failure is reported and then
    /// returned as is.
    pub async fn execute<'a, T, A, Fut>(&'a self, action: A) -> Result<T>
    where
        A: FnOnce(&'a F) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        action(&self.fs).await.inspect_err(|e| {
            report(e);
        })
    }

    async fn call<'a, T, A, Fut>(&'a self, op: &'static str, path: &str, action: A) -> Result<T>
    where
        A: FnOnce(&'a F) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut sw = Stopwatch::started();
        let res = self.execute(action).await;
        sw.pause();
        tracing::debug!(
            op,
            path,
            ok = res.is_ok(),
            elapsed_ms = sw.elapsed().as_millis() as u64,
            "alluxio call"
        );
        res
    }

    pub async fn create_file(&self, path: &str) -> Result<FileOutStream> {
        self.create_file_with(path, CreateFileOptions::default()).await
    }

    pub async fn create_file_with(
        &self,
        path: &str,
        options: CreateFileOptions,
    ) -> Result<FileOutStream> {
        let uri = AlluxioUri::new(path);
        self.call("create_file", path, |fs| fs.create_file(&uri, options))
            .await
    }

    /// Creates the file and any missing parent directories.
    pub async fn create_file_recursive(&self, path: &str) -> Result<FileOutStream> {
        let options = CreateFileOptions {
            recursive: true,
            ..Default::default()
        };
        self.create_file_with(path, options).await
    }

    /// Like [`Self::create_file_recursive`] with a block size of `size_mb` MiB.
    pub async fn create_file_recursive_with_size(
        &self,
        path: &str,
        size_mb: u64,
    ) -> Result<FileOutStream> {
        let options = CreateFileOptions {
            recursive: true,
            block_size_bytes: size_mb.saturating_mul(MIB),
            ..Default::default()
        };
        self.create_file_with(path, options).await
    }

    pub async fn create_directory(&self, path: &str) -> Result<()> {
        self.create_directory_with(path, CreateDirectoryOptions::default())
            .await
    }

    pub async fn create_directory_with(
        &self,
        path: &str,
        options: CreateDirectoryOptions,
    ) -> Result<()> {
        let uri = AlluxioUri::new(path);
        self.call("create_directory", path, |fs| {
            fs.create_directory(&uri, options)
        })
        .await
    }

    pub async fn create_dir_recursive(&self, path: &str) -> Result<()> {
        let options = CreateDirectoryOptions {
            recursive: true,
            ..Default::default()
        };
        self.create_directory_with(path, options).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.delete_with(path, DeleteOptions::default()).await
    }

    pub async fn delete_with(&self, path: &str, options: DeleteOptions) -> Result<()> {
        let uri = AlluxioUri::new(path);
        self.call("delete", path, |fs| fs.delete(&uri, options))
            .await
    }

    /// Deletes a file, or a directory together with everything under it.
    pub async fn delete_recursive(&self, path: &str) -> Result<()> {
        self.delete_with(path, DeleteOptions { recursive: true })
            .await
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        self.exists_with(path, ExistsOptions::default()).await
    }

    pub async fn exists_with(&self, path: &str, options: ExistsOptions) -> Result<bool> {
        let uri = AlluxioUri::new(path);
        self.call("exists", path, |fs| fs.exists(&uri, options))
            .await
    }

    pub async fn free(&self, path: &str) -> Result<()> {
        self.free_with(path, FreeOptions::default()).await
    }

    pub async fn free_with(&self, path: &str, options: FreeOptions) -> Result<()> {
        let uri = AlluxioUri::new(path);
        self.call("free", path, |fs| fs.free(&uri, options)).await
    }

    pub async fn free_recursive(&self, path: &str) -> Result<()> {
        let options = FreeOptions {
            recursive: true,
            ..Default::default()
        };
        self.free_with(path, options).await
    }

    pub async fn get_status(&self, path: &str) -> Result<UriStatus> {
        self.get_status_with(path, GetStatusOptions::default())
            .await
    }

    pub async fn get_status_with(
        &self,
        path: &str,
        options: GetStatusOptions,
    ) -> Result<UriStatus> {
        let uri = AlluxioUri::new(path);
        self.call("get_status", path, |fs| fs.get_status(&uri, options))
            .await
    }

    pub async fn list_status(&self, path: &str) -> Result<Vec<UriStatus>> {
        self.list_status_with(path, ListStatusOptions::default())
            .await
    }

    pub async fn list_status_with(
        &self,
        path: &str,
        options: ListStatusOptions,
    ) -> Result<Vec<UriStatus>> {
        let uri = AlluxioUri::new(path);
        self.call("list_status", path, |fs| fs.list_status(&uri, options))
            .await
    }

    pub async fn load_metadata(&self, path: &str) -> Result<()> {
        self.load_metadata_with(path, LoadMetadataOptions::default())
            .await
    }

    pub async fn load_metadata_with(
        &self,
        path: &str,
        options: LoadMetadataOptions,
    ) -> Result<()> {
        let uri = AlluxioUri::new(path);
        self.call("load_metadata", path, |fs| fs.load_metadata(&uri, options))
            .await
    }

    pub async fn load_metadata_recursive(&self, path: &str) -> Result<()> {
        self.load_metadata_with(path, LoadMetadataOptions { recursive: true })
            .await
    }

    pub async fn mount(&self, alluxio_path: &str, ufs_path: &str) -> Result<()> {
        self.mount_with(alluxio_path, ufs_path, MountOptions::default())
            .await
    }

    pub async fn mount_with(
        &self,
        alluxio_path: &str,
        ufs_path: &str,
        options: MountOptions,
    ) -> Result<()> {
        let src = AlluxioUri::new(alluxio_path);
        let ufs = AlluxioUri::new(ufs_path);
        self.call("mount", alluxio_path, |fs| fs.mount(&src, &ufs, options))
            .await
    }

    pub async fn open_file(&self, path: &str) -> Result<FileInStream> {
        self.open_file_with(path, OpenFileOptions::default()).await
    }

    pub async fn open_file_with(
        &self,
        path: &str,
        options: OpenFileOptions,
    ) -> Result<FileInStream> {
        let uri = AlluxioUri::new(path);
        self.call("open_file", path, |fs| fs.open_file(&uri, options))
            .await
    }

    pub async fn rename(&self, src: &str, dst: &str) -> Result<()> {
        self.rename_with(src, dst, RenameOptions::default()).await
    }

    pub async fn rename_with(&self, src: &str, dst: &str, options: RenameOptions) -> Result<()> {
        let from = AlluxioUri::new(src);
        let to = AlluxioUri::new(dst);
        self.call("rename", src, |fs| fs.rename(&from, &to, options))
            .await
    }

    pub async fn set_attribute(&self, path: &str) -> Result<()> {
        self.set_attribute_with(path, SetAttributeOptions::default())
            .await
    }

    pub async fn set_attribute_with(
        &self,
        path: &str,
        options: SetAttributeOptions,
    ) -> Result<()> {
        let uri = AlluxioUri::new(path);
        self.call("set_attribute", path, |fs| fs.set_attribute(&uri, options))
            .await
    }

    pub async fn unmount(&self, path: &str) -> Result<()> {
        self.unmount_with(path, UnmountOptions::default()).await
    }

    pub async fn unmount_with(&self, path: &str, options: UnmountOptions) -> Result<()> {
        let uri = AlluxioUri::new(path);
        self.call("unmount", path, |fs| fs.unmount(&uri, options))
            .await
    }
}

// ---- write/read helpers used for quick benchmarks ----

impl<F: FileSystem> AlluxioTemplate<F> {
    fn write_options(write_type: WriteType, target_worker: &str) -> CreateFileOptions {
        CreateFileOptions {
            write_type,
            location_policy: resolve_location_policy(target_worker),
            ..Default::default()
        }
    }

    /// Writes `msg` as the whole content of a new file placed by `target_worker`.
    pub async fn write_file(
        &self,
        path: &str,
        msg: &str,
        write_type: WriteType,
        target_worker: &str,
    ) -> Result<()> {
        tracing::debug!(
            "Writing data {msg:?} to {path} at {target_worker}{}{}",
            if write_type.is_cache() { " memory" } else { "" },
            if write_type.is_through() { " disk" } else { "" },
        );
        let mut sw = Stopwatch::started();
        let len = utf8_len_str(msg);
        let uri = AlluxioUri::new(path);
        let options = Self::write_options(write_type, target_worker);

        async {
            let mut out = self.fs.create_file(&uri, options).await?;
            out.write_all(msg.as_bytes()).await?;
            out.shutdown().await?;
            Ok::<_, Error>(())
        }
        .await
        .map_err(Error::into_io)
        .inspect_err(|e| {
            report(e);
        })?;

        sw.pause();
        tracing::debug!(
            bytes = len,
            "[write file] elapsed time = {} ms",
            sw.elapsed().as_millis()
        );
        Ok(())
    }

    /// Fills a new file with copies of `msg` until at least `size_mb` MiB
    /// (fraction dropped) have been written. Returns the bytes written.
    ///
    /// An empty message or a zero target is logged and skipped.
    pub async fn write_large_file(
        &self,
        path: &str,
        msg: &str,
        size_mb: f64,
        write_type: WriteType,
        target_worker: &str,
    ) -> Result<u64> {
        let mut sw = Stopwatch::started();
        let target = padded_target_bytes(size_mb);
        let len = utf8_len_str(msg) as u64;
        if target == 0 || len == 0 {
            tracing::error!(
                "[the len is 0 or the target size is 0]: target size = {target} bytes, message len = {len}"
            );
            return Ok(0);
        }

        let uri = AlluxioUri::new(path);
        let options = Self::write_options(write_type, target_worker);
        let written = async {
            let mut out = BufWriter::new(self.fs.create_file(&uri, options).await?);
            let written = pad_stream(&mut out, msg.as_bytes(), target).await?;
            out.shutdown().await?;
            Ok::<_, Error>(written)
        }
        .await
        .map_err(Error::into_io)
        .inspect_err(|e| {
            report(e);
        })?;

        sw.pause();
        tracing::debug!(
            bytes = written,
            "[write large file] elapsed time = {} ms",
            sw.elapsed().as_millis()
        );
        Ok(written)
    }

    /// Reads the whole file with the client's own placement choice.
    pub async fn read_file(&self, path: &str, read_type: ReadType, to_print: bool) -> Result<u64> {
        self.read_file_at(path, read_type, to_print, NON_SPECIFIED_WORKER)
            .await
    }

    /// Reads the whole file in chunks of up to 10,000,000 bytes, serving it
    /// from `cache_location`. Returns the number of bytes read.
    ///
    /// With `to_print` one info line is logged per chunk; the content itself
    /// is never logged.
    pub async fn read_file_at(
        &self,
        path: &str,
        read_type: ReadType,
        to_print: bool,
        cache_location: &str,
    ) -> Result<u64> {
        let mut sw = Stopwatch::started();
        let uri = AlluxioUri::new(path);
        let options = OpenFileOptions {
            read_type,
            location_policy: resolve_location_policy(cache_location),
        };

        let total = async {
            let mut input = self.fs.open_file(&uri, options).await?;
            let mut buf = vec![0u8; READ_BUFFER_SIZE];
            let mut total = 0u64;
            loop {
                let n = input.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                total += n as u64;
                if to_print {
                    let chunk = String::from_utf8_lossy(&buf[..n]);
                    tracing::info!(bytes = n, chars = chunk.chars().count(), "");
                }
            }
            Ok::<_, Error>(total)
        }
        .await
        .map_err(Error::into_io)
        .inspect_err(|e| {
            report(e);
        })?;

        sw.pause();
        tracing::debug!(
            bytes = total,
            "[read file] elapsed time = {} ms",
            sw.elapsed().as_millis()
        );
        Ok(total)
    }
}

/// Local-disk counterpart of [`AlluxioTemplate::write_large_file`], used as a
/// baseline. The file is flushed and synced before returning.
pub async fn write_large_file_local<P: AsRef<Path>>(
    file_path: P,
    msg: &str,
    size_mb: f64,
) -> Result<u64> {
    let mut sw = Stopwatch::started();
    let target = padded_target_bytes(size_mb);
    let len = utf8_len_str(msg);
    if target == 0 || len == 0 {
        tracing::error!("Zero length input!");
        return Ok(0);
    }

    let mut file = BufWriter::new(tokio::fs::File::create(file_path.as_ref()).await?);
    let written = pad_stream(&mut file, msg.as_bytes(), target).await?;
    file.flush().await?;
    file.get_ref().sync_all().await?;

    sw.pause();
    tracing::debug!(
        bytes = written,
        "[write large file to local] elapsed time = {} ms",
        sw.elapsed().as_millis()
    );
    Ok(written)
}

fn padded_target_bytes(size_mb: f64) -> u64 {
    // float-to-int casts saturate; NaN and negatives become 0
    (size_mb.trunc() as u64).saturating_mul(MIB)
}

async fn pad_stream<W>(out: &mut W, msg: &[u8], target: u64) -> io::Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written = 0u64;
    while written < target {
        out.write_all(msg).await?;
        written += msg.len() as u64;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LocalFileSystem, LocationPolicy, MockFileSystem};
    use crate::error::capture::ErrorEvents;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tracing::instrument::WithSubscriber;
    use std::sync::{Arc, Mutex};

    fn capture<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (seen.clone(), seen)
    }

    #[tokio::test]
    async fn test_recursive_delete_only_flips_flag() {
        let (seen, sink) = capture::<(String, DeleteOptions)>();
        let mut mock = MockFileSystem::new();
        mock.expect_delete().times(2).returning(move |uri, opts| {
            sink.lock().unwrap().push((uri.path().to_string(), opts));
            Ok(())
        });
        let template = AlluxioTemplate::from_client(mock);

        template.delete("/data/old").await.unwrap();
        template.delete_recursive("/data/old").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, seen[1].0);
        assert!(!seen[0].1.recursive);
        assert_eq!(
            seen[1].1,
            DeleteOptions {
                recursive: true,
                ..seen[0].1.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_recursive_create_directory_only_flips_flag() {
        let (seen, sink) = capture::<CreateDirectoryOptions>();
        let mut mock = MockFileSystem::new();
        mock.expect_create_directory()
            .withf(|uri, _| uri.path() == "/a/b/c")
            .times(2)
            .returning(move |_, opts| {
                sink.lock().unwrap().push(opts);
                Ok(())
            });
        let template = AlluxioTemplate::from_client(mock);

        template.create_directory("/a/b/c").await.unwrap();
        template.create_dir_recursive("/a/b/c").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[1],
            CreateDirectoryOptions {
                recursive: true,
                ..seen[0].clone()
            }
        );
    }

    #[tokio::test]
    async fn test_recursive_free_and_load_metadata() {
        let (freed, free_sink) = capture::<FreeOptions>();
        let (loaded, load_sink) = capture::<LoadMetadataOptions>();
        let mut mock = MockFileSystem::new();
        mock.expect_free().times(2).returning(move |_, opts| {
            free_sink.lock().unwrap().push(opts);
            Ok(())
        });
        mock.expect_load_metadata().times(2).returning(move |_, opts| {
            load_sink.lock().unwrap().push(opts);
            Ok(())
        });
        let template = AlluxioTemplate::from_client(mock);

        template.free("/warm").await.unwrap();
        template.free_recursive("/warm").await.unwrap();
        template.load_metadata("/ufs").await.unwrap();
        template.load_metadata_recursive("/ufs").await.unwrap();

        let freed = freed.lock().unwrap();
        assert_eq!(
            freed[1],
            FreeOptions {
                recursive: true,
                ..freed[0].clone()
            }
        );
        let loaded = loaded.lock().unwrap();
        assert!(!loaded[0].recursive);
        assert_eq!(loaded[1], LoadMetadataOptions { recursive: true });
    }

    #[tokio::test]
    async fn test_create_file_variants() {
        let (seen, sink) = capture::<CreateFileOptions>();
        let mut mock = MockFileSystem::new();
        mock.expect_create_file().times(3).returning(move |_, opts| {
            sink.lock().unwrap().push(opts);
            Ok(Box::new(tokio::io::sink()))
        });
        let template = AlluxioTemplate::from_client(mock);

        let _ = template.create_file("/f").await.unwrap();
        let _ = template.create_file_recursive("/f").await.unwrap();
        let _ = template
            .create_file_recursive_with_size("/f", 64)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[1],
            CreateFileOptions {
                recursive: true,
                ..seen[0].clone()
            }
        );
        assert_eq!(
            seen[2],
            CreateFileOptions {
                recursive: true,
                block_size_bytes: 64 * 1024 * 1024,
                ..seen[0].clone()
            }
        );
    }

    #[tokio::test]
    async fn test_two_path_operations_forward_both_paths() {
        let mut mock = MockFileSystem::new();
        mock.expect_rename()
            .withf(|src, dst, _| src.path() == "/a" && dst.path() == "/b")
            .times(1)
            .returning(|_, _, _| Ok(()));
        mock.expect_mount()
            .withf(|src, ufs, opts| {
                src.path() == "/mnt/s3" && ufs.scheme() == Some("file") && opts.read_only
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let template = AlluxioTemplate::from_client(mock);

        template.rename("/a", "/b").await.unwrap();
        template
            .mount_with(
                "/mnt/s3",
                "file:///srv/data",
                MountOptions {
                    read_only: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failures_are_returned_unchanged() {
        let mut mock = MockFileSystem::new();
        mock.expect_get_status()
            .returning(|uri, _| Err(Error::FileDoesNotExist(uri.path().to_string())));
        mock.expect_unmount()
            .returning(|_, _| Err(Error::InvalidArgument("not today".into())));
        let template = AlluxioTemplate::from_client(mock);

        let err = template.get_status("/missing").await.unwrap_err();
        assert!(matches!(err, Error::FileDoesNotExist(ref p) if p == "/missing"));

        let err = template.unmount("/mnt").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m == "not today"));
    }

    #[tokio::test]
    async fn test_each_failure_is_logged_once() {
        let mut mock = MockFileSystem::new();
        mock.expect_delete()
            .returning(|uri, _| Err(Error::DirectoryNotEmpty(uri.path().to_string())));
        mock.expect_create_file()
            .returning(|uri, _| Err(Error::FileAlreadyExists(uri.path().to_string())));
        mock.expect_exists()
            .returning(|_, _| Err(Error::InvalidArgument("bad".into())));
        let template = AlluxioTemplate::from_client(mock);

        let events = ErrorEvents::default();
        async {
            template.delete("/full").await.unwrap_err();
            template
                .write_file("/dup", "x", WriteType::MustCache, NON_SPECIFIED_WORKER)
                .await
                .unwrap_err();
            template.exists("/odd").await.unwrap_err();
        }
        .with_subscriber(events.subscriber())
        .await;

        assert_eq!(
            events.messages(),
            vec![
                "the directory is not empty".to_string(),
                "got an IO failure".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_passes_results_through() {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|uri, _| Ok(uri.path() == "/yes"));
        let template = AlluxioTemplate::from_client(mock);

        let uri = AlluxioUri::new("/yes");
        let found = template
            .execute(|fs| fs.exists(&uri, ExistsOptions::default()))
            .await
            .unwrap();
        assert!(found);
        assert!(!template.exists("/no").await.unwrap());
    }

    #[tokio::test]
    async fn test_large_write_zero_input_is_a_noop() {
        let mut mock = MockFileSystem::new();
        mock.expect_create_file().never();
        let template = AlluxioTemplate::from_client(mock);

        for (msg, size) in [("", 1.0), ("abc", 0.0), ("abc", 0.75), ("abc", -3.0)] {
            let written = template
                .write_large_file("/big", msg, size, WriteType::MustCache, NON_SPECIFIED_WORKER)
                .await
                .unwrap();
            assert_eq!(written, 0);
        }
    }

    #[tokio::test]
    async fn test_large_write_meets_target_with_policy() {
        let mut mock = MockFileSystem::new();
        mock.expect_create_file()
            .withf(|uri, opts| {
                uri.path() == "/big"
                    && opts.write_type == WriteType::CacheThrough
                    && opts.location_policy
                        == Some(LocationPolicy::SpecificHost("worker-1".into()))
            })
            .times(1)
            .returning(|_, _| Ok(Box::new(tokio::io::sink())));
        let template = AlluxioTemplate::from_client(mock);

        let written = template
            .write_large_file("/big", "abc", 1.9, WriteType::CacheThrough, "worker-1")
            .await
            .unwrap();
        assert!(written >= MIB);
        assert!(written - MIB < 3);
        assert_eq!(written % 3, 0);
    }

    /// Sink that counts how many writes reach it.
    struct CountingSink(Arc<AtomicUsize>);

    impl AsyncWrite for CountingSink {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_large_write_batches_small_messages() {
        let writes = Arc::new(AtomicUsize::new(0));
        let sink_writes = writes.clone();
        let mut mock = MockFileSystem::new();
        mock.expect_create_file()
            .times(1)
            .returning(move |_, _| Ok(Box::new(CountingSink(sink_writes.clone()))));
        let template = AlluxioTemplate::from_client(mock);

        let written = template
            .write_large_file("/big", "abc", 1.0, WriteType::MustCache, NON_SPECIFIED_WORKER)
            .await
            .unwrap();
        assert_eq!(written, MIB + 2);
        // 349_526 messages, flushed in buffer-sized pieces
        assert!(writes.load(Ordering::Relaxed) < 1024);
    }

    #[tokio::test]
    async fn test_write_failures_surface_as_io() {
        let mut mock = MockFileSystem::new();
        mock.expect_create_file()
            .returning(|uri, _| Err(Error::FileAlreadyExists(uri.path().to_string())));
        let template = AlluxioTemplate::from_client(mock);

        let err = template
            .write_file("/dup", "x", WriteType::MustCache, "MostAvailableFirst")
            .await
            .unwrap_err();
        match err {
            Error::Io(inner) => assert!(inner.to_string().contains("/dup")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_file_counts_bytes() {
        let mut mock = MockFileSystem::new();
        mock.expect_open_file()
            .withf(|_, opts| {
                opts.read_type == ReadType::NoCache
                    && opts.location_policy == Some(LocationPolicy::MostAvailableFirst)
            })
            .times(1)
            .returning(|_, _| Ok(Box::new(std::io::Cursor::new("héllo".as_bytes().to_vec()))));
        let template = AlluxioTemplate::from_client(mock);

        let n = template
            .read_file_at("/r", ReadType::NoCache, true, "MostAvailableFirst")
            .await
            .unwrap();
        assert_eq!(n, 6);
    }

    #[tokio::test]
    async fn test_with_master_takes_host() {
        let tmp = tempfile::tempdir().unwrap();
        let conf = ClientConfig {
            local_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let template = AlluxioTemplate::<LocalFileSystem>::with_master_config(
            "alluxio://10.1.2.3:19999",
            conf.clone(),
        )
        .await
        .unwrap();
        assert_eq!(template.config().master_hostname, "10.1.2.3");
        assert_eq!(template.config().master_port, 19998);
        assert_eq!(template.client().master(), "alluxio://10.1.2.3:19998");

        let err = AlluxioTemplate::<LocalFileSystem>::with_master_config("/no/host", conf)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_write_large_file_local() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("baseline.dat");
        let written = write_large_file_local(&file, "0123456789", 1.0).await.unwrap();
        assert_eq!(written, 1_048_580);
        assert_eq!(std::fs::metadata(&file).unwrap().len(), written);

        assert_eq!(write_large_file_local(&file, "", 1.0).await.unwrap(), 0);
    }
}
