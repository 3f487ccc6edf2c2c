//! Environment snapshot and overlay.
//!
//! The ambient process environment is captured once into an
//! [`EnvironmentSnapshot`]. Dependency provisioning produces an
//! [`EnvironmentOverlay`], and the compiler receives
//! `overlay.merge_over(&snapshot)` as its complete environment. Nothing here
//! calls `std::env::set_var`.
//!
//! Names and values are kept as [`OsString`]s so variables that are not
//! valid UTF-8 still reach the child process.

use crate::packager::error::{Error, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Complete child environment.
pub type EnvMap = BTreeMap<OsString, OsString>;

/// Copy of the ambient environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: EnvMap,
}

impl EnvironmentSnapshot {
    /// Captures the current process environment, byte for byte.
    pub fn capture() -> Self {
        let vars: EnvMap = std::env::vars_os().collect();
        log::debug!("Captured {} environment variables", vars.len());
        Self { vars }
    }

    /// Looks up a variable, ignoring case on Windows.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        lookup_key(&self.vars, key).and_then(|k| self.vars.get(k).map(OsString::as_os_str))
    }

    pub fn vars(&self) -> &EnvMap {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for EnvironmentSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Environment additions for the native build.
///
/// Path-list variables are prepended to the ambient value; plain variables
/// replace it. Constructed by value: every `with_*` call returns a new
/// overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    prepend: BTreeMap<String, Vec<PathBuf>>,
    set: BTreeMap<String, String>,
}

impl EnvironmentOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path` to the front of the path-list variable `key`.
    ///
    /// Repeated calls for the same key keep insertion order, so the first
    /// path added ends up first in the merged value.
    pub fn with_path(mut self, key: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.prepend
            .entry(key.into())
            .or_default()
            .push(path.as_ref().to_path_buf());
        self
    }

    /// Sets `key` to `value`, replacing any ambient value.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.prepend.is_empty() && self.set.is_empty()
    }

    /// Every key this overlay touches.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.prepend
            .keys()
            .chain(self.set.keys())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.prepend.contains_key(key) || self.set.contains_key(key)
    }

    /// Paths prepended to `key`, if any.
    pub fn paths(&self, key: &str) -> &[PathBuf] {
        self.prepend.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Value set for `key`, if any.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.set.get(key).map(String::as_str)
    }

    /// Produces the full child environment: `snapshot` with this overlay
    /// layered on top.
    ///
    /// The result always contains every key from the snapshot.
    pub fn merge_over(&self, snapshot: &EnvironmentSnapshot) -> Result<EnvMap> {
        let mut merged = snapshot.vars.clone();

        for (key, value) in &self.set {
            let key = stored_key(&merged, key);
            merged.insert(key, value.into());
        }

        for (key, paths) in &self.prepend {
            let key = stored_key(&merged, key);

            let ambient: Vec<PathBuf> = merged
                .get(&key)
                .filter(|v| !v.is_empty())
                .map(|v| std::env::split_paths(v).collect())
                .unwrap_or_default();

            let joined = std::env::join_paths(paths.iter().chain(ambient.iter())).map_err(|e| {
                Error::GenericError(format!("cannot build {} search path: {e}", key.to_string_lossy()))
            })?;
            merged.insert(key, joined);
        }

        Ok(merged)
    }
}

/// The spelling of `key` already present in `vars`, or `key` itself.
fn stored_key(vars: &EnvMap, key: &str) -> OsString {
    lookup_key(vars, key).map_or_else(|| key.into(), OsStr::to_os_string)
}

/// Finds the stored spelling of `key`; case-insensitive on Windows.
fn lookup_key<'a>(vars: &'a EnvMap, key: &str) -> Option<&'a OsStr> {
    if cfg!(windows) {
        vars.keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .map(OsString::as_os_str)
    } else {
        vars.get_key_value(OsStr::new(key)).map(|(k, _)| k.as_os_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EnvironmentSnapshot {
        let path = std::env::join_paths(["/usr/bin", "/bin"]).unwrap();
        [
            (OsString::from("PATH"), path),
            ("HOME".into(), "/home/builder".into()),
            ("RUSTFLAGS".into(), "-Copt-level=3".into()),
        ]
        .into_iter()
        .collect()
    }

    fn value<'a>(env: &'a EnvMap, key: &str) -> &'a str {
        env[OsStr::new(key)].to_str().unwrap()
    }

    #[test]
    fn empty_overlay_is_identity() {
        let snap = snapshot();
        let merged = EnvironmentOverlay::new().merge_over(&snap).unwrap();
        assert_eq!(&merged, snap.vars());
    }

    #[test]
    fn paths_are_prepended_not_replaced() {
        let snap = snapshot();
        let overlay = EnvironmentOverlay::new()
            .with_path("PATH", "/opt/ffmpeg")
            .with_path("PATH", "/opt/pkg-config/bin");
        let merged = overlay.merge_over(&snap).unwrap();

        let entries: Vec<PathBuf> = std::env::split_paths(&merged[OsStr::new("PATH")]).collect();
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/opt/ffmpeg"),
                PathBuf::from("/opt/pkg-config/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn plain_vars_override_ambient() {
        let merged = EnvironmentOverlay::new()
            .with_var("RUSTFLAGS", "-Ctarget-feature=+crt-static")
            .merge_over(&snapshot())
            .unwrap();
        assert_eq!(value(&merged, "RUSTFLAGS"), "-Ctarget-feature=+crt-static");
    }

    #[test]
    fn new_path_variable_has_no_trailing_separator() {
        let merged = EnvironmentOverlay::new()
            .with_path("LIB", "/vcpkg/lib")
            .merge_over(&snapshot())
            .unwrap();
        assert_eq!(value(&merged, "LIB"), "/vcpkg/lib");
    }

    #[test]
    fn merge_never_drops_ambient_keys() {
        let snap = snapshot();
        let merged = EnvironmentOverlay::new()
            .with_path("PATH", "/x")
            .with_var("FFMPEG_DIR", "/x")
            .merge_over(&snap)
            .unwrap();
        for key in snap.vars().keys() {
            assert!(merged.contains_key(key), "lost {}", key.to_string_lossy());
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_ambient_values_survive_merge() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"caf\xe9".to_vec());
        let snap: EnvironmentSnapshot = [
            (OsString::from("PATH"), OsString::from("/usr/bin")),
            (OsString::from("LEGACY_LOCALE_DIR"), raw.clone()),
        ]
        .into_iter()
        .collect();

        let merged = EnvironmentOverlay::new()
            .with_path("PATH", "/opt/ffmpeg")
            .merge_over(&snap)
            .unwrap();
        assert_eq!(merged[OsStr::new("LEGACY_LOCALE_DIR")], raw);
    }

    #[cfg(unix)]
    #[test]
    fn capture_keeps_non_utf8_variables() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"caf\xe9".to_vec());
        // SAFETY: the name is unique to this test and std serializes
        // environment access within the process.
        unsafe { std::env::set_var("RELEASE_PACKAGER_NON_UTF8_TEST", &raw) };
        let snap = EnvironmentSnapshot::capture();
        unsafe { std::env::remove_var("RELEASE_PACKAGER_NON_UTF8_TEST") };

        let merged = EnvironmentOverlay::new()
            .with_path("PATH", "/opt/ffmpeg")
            .merge_over(&snap)
            .unwrap();
        assert_eq!(merged[OsStr::new("RELEASE_PACKAGER_NON_UTF8_TEST")], raw);
    }

    #[test]
    fn merge_leaves_process_environment_alone() {
        let before = std::env::var_os("RELEASE_PACKAGER_OVERLAY_CHECK");
        let _ = EnvironmentOverlay::new()
            .with_var("RELEASE_PACKAGER_OVERLAY_CHECK", "1")
            .merge_over(&EnvironmentSnapshot::capture())
            .unwrap();
        assert_eq!(std::env::var_os("RELEASE_PACKAGER_OVERLAY_CHECK"), before);
    }

    #[cfg(windows)]
    #[test]
    fn keys_match_case_insensitively_on_windows() {
        let snap: EnvironmentSnapshot = [("Path", r"C:\Windows")].into_iter().collect();
        let merged = EnvironmentOverlay::new()
            .with_path("PATH", r"C:\ffmpeg")
            .merge_over(&snap)
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(value(&merged, "Path"), r"C:\ffmpeg;C:\Windows");
    }
}
