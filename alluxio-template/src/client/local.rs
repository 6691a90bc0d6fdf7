//! 本地目录客户端：用本地文件系统模拟单节点集群（实现 FileSystem）。
//!
//! Namespace paths live under `root`. `mount` grafts a local under-storage
//! directory onto a namespace path; lookups pick the longest matching mount
//! point. There is no cache tier: write types, placement policies and `free`
//! only affect the reported status.

use std::collections::{BTreeMap, HashMap};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use crate::client::{
    Connect, CreateDirectoryOptions, CreateFileOptions, DeleteOptions, ExistsOptions,
    FileInStream, FileOutStream, FileSystem, FreeOptions, GetStatusOptions, ListStatusOptions,
    LoadMetadataOptions, MountOptions, OpenFileOptions, RenameOptions, SetAttributeOptions,
    UnmountOptions, UriStatus,
};
use crate::config::ClientConfig;
use crate::consts::DEFAULT_BLOCK_SIZE_BYTES;
use crate::error::{Error, Result};
use crate::uri::AlluxioUri;

#[derive(Debug, Clone)]
struct MountPoint {
    ufs: PathBuf,
    read_only: bool,
}

#[derive(Debug, Clone, Default)]
struct Attributes {
    block_size_bytes: Option<u64>,
    cached: bool,
    pinned: bool,
    persisted: bool,
    ttl: Option<Duration>,
    owner: Option<String>,
    group: Option<String>,
}

struct Resolved {
    local: PathBuf,
    read_only: bool,
}

impl Resolved {
    fn ensure_writable(&self, path: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::Alluxio(format!(
                "{path} is under a read-only mount point"
            )));
        }
        Ok(())
    }
}

pub struct LocalFileSystem {
    root: PathBuf,
    master: String,
    mounts: RwLock<BTreeMap<String, MountPoint>>,
    attrs: RwLock<HashMap<String, Attributes>>,
}

impl LocalFileSystem {
    /// The root directory must already exist.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            master: String::from("local"),
            mounts: RwLock::new(BTreeMap::new()),
            attrs: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    /// Namespace paths that currently have something mounted on them.
    pub async fn mount_points(&self) -> Vec<String> {
        self.mounts.read().await.keys().cloned().collect()
    }

    fn check_path(uri: &AlluxioUri) -> Result<()> {
        if !uri.is_absolute() {
            return Err(Error::InvalidPath(format!(
                "{uri} is not an absolute path"
            )));
        }
        if Path::new(uri.path())
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::InvalidPath(format!("{uri} contains `..`")));
        }
        Ok(())
    }

    async fn resolve(&self, uri: &AlluxioUri) -> Result<Resolved> {
        Self::check_path(uri)?;
        let path = uri.path();
        let mounts = self.mounts.read().await;
        let hit = mounts
            .iter()
            .filter(|(mnt, _)| {
                path == mnt.as_str()
                    || path
                        .strip_prefix(mnt.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(mnt, _)| mnt.len());

        Ok(match hit {
            Some((mnt, mp)) => {
                let rest = path[mnt.len()..].trim_start_matches('/');
                let local = if rest.is_empty() {
                    mp.ufs.clone()
                } else {
                    mp.ufs.join(rest)
                };
                Resolved {
                    local,
                    read_only: mp.read_only,
                }
            }
            None => Resolved {
                local: self.root.join(path.trim_start_matches('/')),
                read_only: false,
            },
        })
    }

    /// Fails when a mount point sits at `path` or anywhere below it.
    async fn ensure_no_mounts_under(&self, path: &str) -> Result<()> {
        let prefix = if path == "/" {
            String::from("/")
        } else {
            format!("{path}/")
        };
        let mounts = self.mounts.read().await;
        if let Some(mnt) = mounts
            .keys()
            .find(|k| k.as_str() == path || k.starts_with(&prefix))
        {
            return Err(Error::InvalidPath(format!(
                "{path} is or contains the mount point {mnt}, unmount it first"
            )));
        }
        Ok(())
    }

    /// Mount points whose parent is `dir`, with the directory they expose.
    async fn mounts_in(&self, dir: &AlluxioUri) -> Vec<(AlluxioUri, PathBuf)> {
        self.mounts
            .read()
            .await
            .iter()
            .map(|(mnt, mp)| (AlluxioUri::new(mnt), mp.ufs.clone()))
            .filter(|(mnt, _)| mnt.parent().is_some_and(|p| p.path() == dir.path()))
            .collect()
    }

    async fn present(local: &Path) -> Result<bool> {
        match fs::metadata(local).await {
            Ok(_) => Ok(true),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn metadata(local: &Path, path: &str) -> Result<Metadata> {
        fs::metadata(local)
            .await
            .map_err(|e| Error::from_io(e, path))
    }

    async fn is_empty_dir(local: &Path, path: &str) -> Result<bool> {
        let mut rd = fs::read_dir(local)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(rd.next_entry().await?.is_none())
    }

    /// All entries below `uri`, depth first, excluding `uri` itself.
    async fn descendants(uri: &AlluxioUri, local: &Path) -> Result<Vec<(AlluxioUri, PathBuf)>> {
        let mut out = Vec::new();
        let mut queue = vec![(uri.clone(), local.to_path_buf())];
        while let Some((dir_uri, dir_local)) = queue.pop() {
            let mut rd = fs::read_dir(&dir_local).await?;
            while let Some(entry) = rd.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let child = (dir_uri.join(&name), entry.path());
                if entry.file_type().await?.is_dir() {
                    queue.push(child.clone());
                }
                out.push(child);
            }
        }
        Ok(out)
    }

    async fn status_of(&self, uri: &AlluxioUri, meta: &Metadata) -> UriStatus {
        let path = uri.path().to_string();
        let attrs = self
            .attrs
            .read()
            .await
            .get(&path)
            .cloned()
            .unwrap_or_default();
        let mount_point = self.mounts.read().await.contains_key(&path);
        let modified = meta.modified().ok();
        let created = meta.created().ok().or(modified);

        UriStatus {
            name: uri.name().to_string(),
            folder: meta.is_dir(),
            length: if meta.is_dir() { 0 } else { meta.len() },
            block_size_bytes: attrs.block_size_bytes.unwrap_or(DEFAULT_BLOCK_SIZE_BYTES),
            creation_time_ms: to_millis(created),
            last_modification_time_ms: to_millis(modified),
            in_memory_percentage: if attrs.cached && !meta.is_dir() { 100 } else { 0 },
            pinned: attrs.pinned,
            persisted: attrs.persisted,
            ttl: attrs.ttl,
            mode: mode_of(meta),
            owner: attrs.owner.unwrap_or_default(),
            group: attrs.group.unwrap_or_default(),
            mount_point,
            path,
        }
    }

    async fn forget(&self, path: &str) {
        let prefix = format!("{path}/");
        self.attrs
            .write()
            .await
            .retain(|k, _| k != path && !k.starts_with(&prefix));
    }
}

#[async_trait]
impl Connect for LocalFileSystem {
    async fn connect(config: &ClientConfig) -> Result<Self> {
        fs::create_dir_all(&config.local_root).await?;
        let mut client = Self::new(&config.local_root);
        client.master = config.master_address();
        tracing::debug!(
            "local client for {} backed by {}",
            client.master,
            client.root.display()
        );
        Ok(client)
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn create_directory(
        &self,
        uri: &AlluxioUri,
        options: CreateDirectoryOptions,
    ) -> Result<()> {
        let path = uri.path();
        let target = self.resolve(uri).await?;
        target.ensure_writable(path)?;

        match fs::metadata(&target.local).await {
            Ok(meta) if options.allow_exists && meta.is_dir() => return Ok(()),
            Ok(_) => return Err(Error::FileAlreadyExists(path.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io(e)),
        }

        let res = if options.recursive {
            fs::create_dir_all(&target.local).await
        } else {
            fs::create_dir(&target.local).await
        };
        res.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileDoesNotExist(parent_of(uri)),
            _ => Error::from_io(e, path),
        })?;

        if let Some(mode) = options.mode {
            apply_mode(&target.local, mode).await?;
        }
        tracing::trace!(path, write_type = %options.write_type, "created directory");
        Ok(())
    }

    async fn create_file(
        &self,
        uri: &AlluxioUri,
        options: CreateFileOptions,
    ) -> Result<FileOutStream> {
        let path = uri.path();
        let target = self.resolve(uri).await?;
        target.ensure_writable(path)?;

        let parent = target
            .local
            .parent()
            .ok_or_else(|| Error::InvalidPath(format!("{path} has no parent")))?;
        match fs::metadata(parent).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::InvalidPath(format!(
                    "parent of {path} is not a directory"
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !options.recursive {
                    return Err(Error::FileDoesNotExist(parent_of(uri)));
                }
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::from_io(e, path))?;
            }
            Err(e) => return Err(Error::Io(e)),
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target.local)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        if let Some(mode) = options.mode {
            apply_mode(&target.local, mode).await?;
        }

        self.attrs.write().await.insert(
            path.to_string(),
            Attributes {
                block_size_bytes: Some(options.block_size_bytes),
                cached: options.write_type.is_cache(),
                persisted: options.write_type.is_through(),
                ttl: options.ttl,
                ..Default::default()
            },
        );
        tracing::trace!(
            path,
            write_type = %options.write_type,
            policy = ?options.location_policy,
            "created file"
        );
        Ok(Box::new(file))
    }

    async fn delete(&self, uri: &AlluxioUri, options: DeleteOptions) -> Result<()> {
        let path = uri.path();
        if uri.is_root() {
            return Err(Error::InvalidPath("cannot delete the root directory".into()));
        }
        self.ensure_no_mounts_under(path).await?;
        let target = self.resolve(uri).await?;
        target.ensure_writable(path)?;

        let meta = Self::metadata(&target.local, path).await?;
        let res = if meta.is_dir() {
            if options.recursive {
                fs::remove_dir_all(&target.local).await
            } else {
                if !Self::is_empty_dir(&target.local, path).await? {
                    return Err(Error::DirectoryNotEmpty(path.to_string()));
                }
                fs::remove_dir(&target.local).await
            }
        } else {
            fs::remove_file(&target.local).await
        };
        res.map_err(|e| Error::from_io(e, path))?;

        self.forget(path).await;
        Ok(())
    }

    async fn exists(&self, uri: &AlluxioUri, _options: ExistsOptions) -> Result<bool> {
        let target = self.resolve(uri).await?;
        Self::present(&target.local).await
    }

    async fn free(&self, uri: &AlluxioUri, options: FreeOptions) -> Result<()> {
        let path = uri.path();
        let target = self.resolve(uri).await?;
        let meta = Self::metadata(&target.local, path).await?;

        let mut paths = vec![path.to_string()];
        if meta.is_dir() {
            let children = Self::descendants(uri, &target.local).await?;
            if !children.is_empty() && !options.recursive {
                return Err(Error::DirectoryNotEmpty(format!(
                    "{path} (free a non-empty directory recursively)"
                )));
            }
            paths.extend(children.into_iter().map(|(u, _)| u.path().to_string()));
        }

        let mut attrs = self.attrs.write().await;
        if !options.forced {
            if let Some(pinned) = paths
                .iter()
                .find(|p| attrs.get(p.as_str()).is_some_and(|a| a.pinned))
            {
                return Err(Error::Alluxio(format!(
                    "{pinned} is pinned, set forced to free it"
                )));
            }
        }
        for p in &paths {
            if let Some(a) = attrs.get_mut(p.as_str()) {
                a.cached = false;
            }
        }
        tracing::trace!(path, entries = paths.len(), "freed");
        Ok(())
    }

    async fn get_status(&self, uri: &AlluxioUri, _options: GetStatusOptions) -> Result<UriStatus> {
        let target = self.resolve(uri).await?;
        let meta = Self::metadata(&target.local, uri.path()).await?;
        Ok(self.status_of(uri, &meta).await)
    }

    async fn list_status(
        &self,
        uri: &AlluxioUri,
        _options: ListStatusOptions,
    ) -> Result<Vec<UriStatus>> {
        let path = uri.path();
        let target = self.resolve(uri).await?;
        let meta = Self::metadata(&target.local, path).await?;
        if !meta.is_dir() {
            return Ok(vec![self.status_of(uri, &meta).await]);
        }

        let mut out = Vec::new();
        let mut rd = fs::read_dir(&target.local)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        while let Some(entry) = rd.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_meta = entry.metadata().await?;
            out.push(self.status_of(&uri.join(&name), &child_meta).await);
        }
        for (mnt, ufs) in self.mounts_in(uri).await {
            let mnt_meta = Self::metadata(&ufs, mnt.path()).await?;
            out.push(self.status_of(&mnt, &mnt_meta).await);
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn load_metadata(&self, uri: &AlluxioUri, options: LoadMetadataOptions) -> Result<()> {
        let target = self.resolve(uri).await?;
        Self::metadata(&target.local, uri.path()).await?;
        tracing::trace!(path = uri.path(), recursive = options.recursive, "metadata loaded");
        Ok(())
    }

    async fn mount(
        &self,
        alluxio_path: &AlluxioUri,
        ufs_path: &AlluxioUri,
        options: MountOptions,
    ) -> Result<()> {
        let path = alluxio_path.path();
        if alluxio_path.is_root() {
            return Err(Error::InvalidPath("cannot mount over the root".into()));
        }
        match ufs_path.scheme() {
            None | Some("file") => {}
            Some(other) => {
                return Err(Error::InvalidPath(format!(
                    "unsupported under storage scheme `{other}` in {ufs_path}"
                )));
            }
        }
        let ufs = PathBuf::from(ufs_path.path());
        let ufs_meta = Self::metadata(&ufs, ufs_path.path()).await?;
        if !ufs_meta.is_dir() {
            return Err(Error::InvalidPath(format!(
                "{ufs_path} is not a directory"
            )));
        }

        let parent = alluxio_path
            .parent()
            .ok_or_else(|| Error::InvalidPath(format!("{alluxio_path} has no parent")))?;
        let parent_target = self.resolve(&parent).await?;
        match fs::metadata(&parent_target.local).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::InvalidPath(format!(
                    "parent of {path} is not a directory"
                )));
            }
            Err(e) => return Err(Error::from_io(e, parent.path())),
        }

        let target = self.resolve(alluxio_path).await?;
        if Self::present(&target.local).await? {
            return Err(Error::FileAlreadyExists(path.to_string()));
        }

        let mut mounts = self.mounts.write().await;
        if mounts.contains_key(path) {
            return Err(Error::FileAlreadyExists(path.to_string()));
        }
        mounts.insert(
            path.to_string(),
            MountPoint {
                ufs,
                read_only: options.read_only,
            },
        );
        tracing::debug!(path, ufs = %ufs_path, read_only = options.read_only, "mounted");
        Ok(())
    }

    async fn open_file(&self, uri: &AlluxioUri, options: OpenFileOptions) -> Result<FileInStream> {
        let path = uri.path();
        let target = self.resolve(uri).await?;
        let meta = Self::metadata(&target.local, path).await?;
        if meta.is_dir() {
            return Err(Error::Alluxio(format!(
                "cannot read from {path} because it is a directory"
            )));
        }
        let file = fs::File::open(&target.local)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        tracing::trace!(
            path,
            read_type = %options.read_type,
            policy = ?options.location_policy,
            "opened file"
        );
        Ok(Box::new(file))
    }

    async fn rename(&self, src: &AlluxioUri, dst: &AlluxioUri, _options: RenameOptions) -> Result<()> {
        self.ensure_no_mounts_under(src.path()).await?;
        let from = self.resolve(src).await?;
        let to = self.resolve(dst).await?;
        from.ensure_writable(src.path())?;
        to.ensure_writable(dst.path())?;

        Self::metadata(&from.local, src.path()).await?;
        if Self::present(&to.local).await? {
            return Err(Error::FileAlreadyExists(dst.path().to_string()));
        }
        if let Some(parent) = to.local.parent() {
            if !Self::present(parent).await? {
                return Err(Error::FileDoesNotExist(parent_of(dst)));
            }
        }
        fs::rename(&from.local, &to.local).await?;

        // 属性跟随路径迁移
        let mut attrs = self.attrs.write().await;
        let prefix = format!("{}/", src.path());
        let moved: Vec<String> = attrs
            .keys()
            .filter(|k| k.as_str() == src.path() || k.starts_with(&prefix))
            .cloned()
            .collect();
        for key in moved {
            if let Some(a) = attrs.remove(&key) {
                let new_key = format!("{}{}", dst.path(), &key[src.path().len()..]);
                attrs.insert(new_key, a);
            }
        }
        Ok(())
    }

    async fn set_attribute(&self, uri: &AlluxioUri, options: SetAttributeOptions) -> Result<()> {
        let path = uri.path();
        let target = self.resolve(uri).await?;
        let meta = Self::metadata(&target.local, path).await?;

        let mut entries = vec![(uri.clone(), target.local.clone())];
        if options.recursive && meta.is_dir() {
            entries.extend(Self::descendants(uri, &target.local).await?);
        }

        for (entry_uri, entry_local) in &entries {
            if let Some(mode) = options.mode {
                apply_mode(entry_local, mode).await?;
            }
            let mut attrs = self.attrs.write().await;
            let a = attrs.entry(entry_uri.path().to_string()).or_default();
            if let Some(pinned) = options.pinned {
                a.pinned = pinned;
            }
            if let Some(persisted) = options.persisted {
                a.persisted = persisted;
            }
            if options.ttl.is_some() {
                a.ttl = options.ttl;
            }
            if let Some(owner) = &options.owner {
                a.owner = Some(owner.clone());
            }
            if let Some(group) = &options.group {
                a.group = Some(group.clone());
            }
        }
        Ok(())
    }

    async fn unmount(&self, uri: &AlluxioUri, _options: UnmountOptions) -> Result<()> {
        Self::check_path(uri)?;
        let path = uri.path();
        if self.mounts.write().await.remove(path).is_none() {
            return Err(Error::InvalidPath(format!("{path} is not a mount point")));
        }
        self.forget(path).await;
        tracing::debug!(path, "unmounted");
        Ok(())
    }
}

fn parent_of(uri: &AlluxioUri) -> String {
    uri.parent()
        .map(|p| p.path().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

fn to_millis(t: Option<SystemTime>) -> u64 {
    t.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn mode_of(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(_meta: &Metadata) -> u32 {
    0
}

#[cfg(unix)]
async fn apply_mode(local: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(local, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn apply_mode(_local: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
