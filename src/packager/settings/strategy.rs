//! Audio codec dependency strategy.

/// How the native build satisfies its FFmpeg dependency.
///
/// Selected once per run and never changed afterwards. The strategy decides
/// which [`EnvironmentOverlay`](crate::packager::EnvironmentOverlay) entries
/// are produced and whether runtime libraries are staged next to the binary.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyStrategy {
    /// Dependency is preinstalled or not needed; empty overlay.
    #[default]
    None,
    /// Download prebuilt shared libraries and ship them with the application.
    DynamicBundle,
    /// Build a static copy with vcpkg and link it into the binary.
    StaticLink,
}

impl DependencyStrategy {
    /// Overlay keys the native compiler step needs under this strategy.
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::None => &[],
            Self::DynamicBundle => &["PATH", "PKG_CONFIG_PATH", "FFMPEG_DIR"],
            Self::StaticLink => &["LIB", "RUSTFLAGS"],
        }
    }

    /// Whether shared libraries must be copied into the staging tree.
    pub fn stages_runtime_libraries(self) -> bool {
        matches!(self, Self::DynamicBundle)
    }

    /// All strategies, in declaration order.
    pub const ALL: [DependencyStrategy; 3] = [Self::None, Self::DynamicBundle, Self::StaticLink];
}

impl std::fmt::Display for DependencyStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::DynamicBundle => "dynamic-bundle",
            Self::StaticLink => "static-link",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dynamic_bundle_stages_libraries() {
        let staged: Vec<_> = DependencyStrategy::ALL
            .into_iter()
            .filter(|s| s.stages_runtime_libraries())
            .collect();
        assert_eq!(staged, vec![DependencyStrategy::DynamicBundle]);
    }

    #[test]
    fn deserializes_kebab_case() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            strategy: DependencyStrategy,
        }
        let w: Wrapper = toml::from_str("strategy = \"static-link\"").unwrap();
        assert_eq!(w.strategy, DependencyStrategy::StaticLink);
        assert_eq!(w.strategy.to_string(), "static-link");
    }
}
