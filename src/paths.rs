//! String-level path normalization
//!
//! Nothing here touches the filesystem. Paths are compared and split
//! according to a [`PathFlavor`], which defaults to the host platform but
//! can be swapped to exercise the other platform's rules.

/// Path comparison and separator rules of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFlavor {
    /// Case-sensitive, `/`-separated paths.
    Posix,
    /// Case-insensitive paths separated by `\` (and tolerating `/`).
    Windows,
}

impl PathFlavor {
    /// The flavor of the host platform.
    pub fn native() -> Self {
        if cfg!(windows) {
            PathFlavor::Windows
        } else {
            PathFlavor::Posix
        }
    }

    /// The native path separator.
    pub fn sep(self) -> char {
        match self {
            PathFlavor::Posix => '/',
            PathFlavor::Windows => '\\',
        }
    }

    /// Normalize a path for comparison.
    pub fn normcase(self, path: &str) -> String {
        match self {
            PathFlavor::Posix => path.to_string(),
            PathFlavor::Windows => path.to_lowercase().replace('/', "\\"),
        }
    }

    /// Rewrite `/` separators into the native separator.
    pub fn to_native(self, path: &str) -> String {
        match self {
            PathFlavor::Posix => path.to_string(),
            PathFlavor::Windows => path.replace('/', "\\"),
        }
    }

    /// Return `path` relative to `root`, if it lies under it.
    ///
    /// The returned path keeps the original casing of `path` and uses the
    /// native separator.
    pub fn relative_to(self, path: &str, root: &str) -> Option<String> {
        let path = self.to_native(path);
        let root = self.to_native(root);
        let root = root.trim_end_matches(self.sep());

        // Lowercasing may change byte lengths, so compare char by char.
        let mut rest = path.chars();
        for expected in root.chars() {
            let actual = rest.next()?;
            if self.normcase(&actual.to_string()) != self.normcase(&expected.to_string()) {
                return None;
            }
        }
        let rest = rest.as_str();
        let rel = rest.strip_prefix(self.sep())?;
        let rel = rel.trim_start_matches(self.sep());
        if rel.is_empty() {
            return None;
        }
        Some(rel.to_string())
    }

    /// Split an absolute path into `(root, relfile)` given the relative
    /// file reported by the collection engine.
    pub fn split_root(self, path: &str, relfile_hint: &str) -> Option<(String, String)> {
        let path = self.to_native(path);
        let hint = self.to_native(relfile_hint);
        let hint = hint.trim_start_matches(&format!(".{}", self.sep()));
        if hint.is_empty() {
            return None;
        }

        let suffix = format!("{}{}", self.sep(), self.normcase(hint));
        let normalized = self.normcase(&path);
        if !normalized.ends_with(&suffix) || normalized.len() != path.len() {
            return None;
        }
        let split = path.len() - suffix.len();
        let root = path.get(..split)?;
        let relfile = path.get(split + 1..)?;
        if root.is_empty() {
            return None;
        }
        Some((root.to_string(), relfile.to_string()))
    }

    /// The final component of a native path.
    pub fn basename(self, path: &str) -> &str {
        path.rsplit(self.sep()).next().unwrap_or(path)
    }
}

impl Default for PathFlavor {
    fn default() -> Self {
        Self::native()
    }
}
