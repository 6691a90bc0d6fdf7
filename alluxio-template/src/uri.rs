//! `AlluxioUri`: `scheme://host:port/path` or a bare namespace path.
//!
//! Parsing never fails. Whether a path is acceptable is up to the client
//! that receives it.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlluxioUri {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: String,
}

impl AlluxioUri {
    pub fn new(s: &str) -> Self {
        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (Some(scheme.to_string()), rest),
            None => (None, s),
        };

        let (authority, raw_path) = if scheme.is_some() {
            match rest.find('/') {
                Some(i) => (&rest[..i], &rest[i..]),
                None => (rest, "/"),
            }
        } else {
            ("", rest)
        };

        let (host, port) = split_authority(authority);
        Self {
            scheme,
            host,
            port,
            path: normalize(raw_path),
        }
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_absolute(&self) -> bool {
        self.path.starts_with('/')
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Last path component; empty for the root.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    pub fn parent(&self) -> Option<AlluxioUri> {
        if self.is_root() || !self.is_absolute() {
            return None;
        }
        let parent = match self.path.rfind('/') {
            Some(0) => "/".to_string(),
            Some(i) => self.path[..i].to_string(),
            None => return None,
        };
        Some(Self {
            path: parent,
            ..self.clone()
        })
    }

    pub fn join(&self, child: &str) -> AlluxioUri {
        let joined = if self.is_root() {
            format!("/{child}")
        } else {
            format!("{}/{child}", self.path)
        };
        Self {
            path: normalize(&joined),
            ..self.clone()
        }
    }
}

impl fmt::Display for AlluxioUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
            if let Some(host) = &self.host {
                f.write_str(host)?;
            }
            if let Some(port) = self.port {
                write!(f, ":{port}")?;
            }
        }
        f.write_str(&self.path)
    }
}

impl From<&str> for AlluxioUri {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

fn split_authority(authority: &str) -> (Option<String>, Option<u16>) {
    if authority.is_empty() {
        return (None, None);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(port) if !host.is_empty() => (Some(host.to_string()), Some(port)),
            Ok(port) => (None, Some(port)),
            Err(_) => (Some(authority.to_string()), None),
        },
        None => (Some(authority.to_string()), None),
    }
}

/// 折叠重复的 `/`，去掉结尾的 `/`（根目录除外）。
fn normalize(p: &str) -> String {
    if p.is_empty() {
        return String::new();
    }
    let absolute = p.starts_with('/');
    let parts: Vec<&str> = p
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}
