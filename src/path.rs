use std::fmt;

/// Depth of a storage target. Also names the sysmeta namespace
/// (`x-<server_type>-sysmeta-`) that applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerType {
    Account,
    Container,
    Object,
}

impl ServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerType::Account => "account",
            ServerType::Container => "container",
            ServerType::Object => "object",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rooted account / container / object path.
///
/// Segments are never empty: an empty container or object segment is treated
/// as absent, and an object without a container is dropped. The object
/// segment may contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath {
    account: String,
    container: Option<String>,
    object: Option<String>,
}

impl StoragePath {
    pub fn new(
        account: impl Into<String>,
        container: Option<&str>,
        object: Option<&str>,
    ) -> Self {
        let container = container.filter(|c| !c.is_empty()).map(str::to_string);
        let object = match container {
            Some(_) => object.filter(|o| !o.is_empty()).map(str::to_string),
            None => None,
        };
        Self {
            account: account.into(),
            container,
            object,
        }
    }

    /// Parse a request path of the form `/<version>/<account>[/<container>[/<object>]]`.
    ///
    /// The path is percent-decoded before splitting. Returns `None` when the
    /// request does not target an account-scoped resource.
    pub fn from_request_path(uri_path: &str) -> Option<Self> {
        let decoded = urlencoding::decode(uri_path).ok()?;
        let segs = split_path(&decoded, 2, 4)?;
        Some(Self::new(segs[1], segs.get(2).copied(), segs.get(3).copied()))
    }

    /// Parse a full object path `/<account>/<container>/<object>`.
    ///
    /// All three segments must be present and non-empty.
    pub fn from_object_path(path: &str) -> Option<Self> {
        let segs = split_path(path, 3, 3)?;
        Some(Self::new(segs[0], Some(segs[1]), Some(segs[2])))
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    pub fn server_type(&self) -> ServerType {
        match (&self.container, &self.object) {
            (Some(_), Some(_)) => ServerType::Object,
            (Some(_), None) => ServerType::Container,
            _ => ServerType::Account,
        }
    }

    /// `/<account>`
    pub fn account_path(&self) -> String {
        format!("/{}", self.account)
    }

    /// `/<account>/<container>`, if the path reaches container depth.
    pub fn container_path(&self) -> Option<String> {
        self.container
            .as_ref()
            .map(|c| format!("/{}/{}", self.account, c))
    }

    /// `/<account>/<container>/<object>`, if the path reaches object depth.
    pub fn object_path(&self) -> Option<String> {
        match (&self.container, &self.object) {
            (Some(c), Some(o)) => Some(format!("/{}/{}/{}", self.account, c, o)),
            _ => None,
        }
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.container, &self.object) {
            (Some(c), Some(o)) => write!(f, "/{}/{}/{}", self.account, c, o),
            (Some(c), None) => write!(f, "/{}/{}", self.account, c),
            _ => write!(f, "/{}", self.account),
        }
    }
}

/// Split a rooted path into between `minsegs` and `maxsegs` segments.
///
/// The last segment takes the remainder of the path, slashes included. The
/// first `minsegs` segments must be non-empty; later ones may be empty.
pub fn split_path(path: &str, minsegs: usize, maxsegs: usize) -> Option<Vec<&str>> {
    let mut parts = path.splitn(maxsegs + 1, '/');
    if !parts.next()?.is_empty() {
        return None;
    }
    let segs: Vec<&str> = parts.collect();
    if segs.len() < minsegs || segs.len() > maxsegs {
        return None;
    }
    if segs[..minsegs].iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segs)
}
