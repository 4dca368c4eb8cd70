//! Version info port.

/// Source of the tool version string sent to the remote service.
///
/// Injected so callers are not tied to any particular introspection
/// mechanism; production uses the crate version baked in at compile time.
pub trait VersionInfoProvider: Send + Sync {
    /// Plain version string, e.g. `0.1.0`.
    fn version(&self) -> String;
}

/// Version string baked in from the crate manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrateVersion;

impl VersionInfoProvider for CrateVersion {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_version_is_non_empty() {
        assert!(!CrateVersion.version().is_empty());
    }
}
