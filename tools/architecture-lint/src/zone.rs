//! File classification and the rules attached to each zone.

use std::fmt;
use std::path::Path;

/// Top-level modules of the `frontend` library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Schemas, ports and the synchronization core.
    Domain,
    /// The `rental-console` command-line front end.
    Inbound,
    /// The HTTP resource client.
    Outbound,
    /// Doubles and fixtures, compiled for tests only.
    TestSupport,
}

impl Layer {
    /// Parse a top-level module name.
    #[must_use]
    pub fn from_module(name: &str) -> Option<Self> {
        match name {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            "test_support" => Some(Self::TestSupport),
            _ => None,
        }
    }

    /// Module name as written in paths.
    #[must_use]
    pub const fn module(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::TestSupport => "test_support",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module())
    }
}

/// Part of `frontend/src` a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Anything under `domain/`.
    Domain,
    /// Anything under `inbound/`.
    Inbound,
    /// Anything under `outbound/`.
    Outbound,
    /// `main.rs` and `wiring.rs`, the binary that joins the adapters.
    Wiring,
    /// `lib.rs` and `test_support`, which are not checked.
    Exempt,
}

impl Zone {
    /// Zone of a path relative to `frontend/src`.
    ///
    /// Returns `None` for files outside every zone, so a new top-level file
    /// has to be placed deliberately.
    #[must_use]
    pub fn classify(file: &Path) -> Option<Self> {
        let first = file.components().next()?.as_os_str().to_str()?;
        match first {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            "main.rs" | "wiring.rs" => Some(Self::Wiring),
            "lib.rs" | "test_support.rs" | "test_support" => Some(Self::Exempt),
            _ => None,
        }
    }

    /// Whether `crate::` in this zone names the library rather than the binary.
    #[must_use]
    pub const fn is_library(self) -> bool {
        !matches!(self, Self::Wiring)
    }

    /// Library layers reachable from this zone's production code.
    const fn reachable(self) -> &'static [Layer] {
        match self {
            Self::Domain => &[Layer::Domain],
            Self::Inbound => &[Layer::Domain, Layer::Inbound],
            Self::Outbound => &[Layer::Domain, Layer::Outbound],
            Self::Wiring => &[Layer::Domain, Layer::Inbound, Layer::Outbound],
            Self::Exempt => &[
                Layer::Domain,
                Layer::Inbound,
                Layer::Outbound,
                Layer::TestSupport,
            ],
        }
    }

    /// Crates owned by another zone.
    const fn banned_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &[
                "actix_web",
                "clap",
                "color_eyre",
                "ortho_config",
                "reqwest",
                "tracing_subscriber",
                "url",
            ],
            Self::Inbound => &["actix_web", "reqwest", "tracing_subscriber"],
            Self::Outbound => &["clap", "color_eyre", "ortho_config", "tracing_subscriber"],
            Self::Wiring | Self::Exempt => &[],
        }
    }

    /// Whether code in this zone may name `layer`.
    ///
    /// `test_support` is open to test code in every zone and closed to
    /// production code in all of them.
    #[must_use]
    pub fn permits(self, layer: Layer, in_test: bool) -> bool {
        if layer == Layer::TestSupport {
            return in_test || self == Self::Exempt;
        }
        self.reachable().contains(&layer)
    }

    /// Whether this zone may use the external crate `name`.
    #[must_use]
    pub fn permits_crate(self, name: &str) -> bool {
        !self.banned_crates().contains(&name)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Wiring => "wiring",
            Self::Exempt => "exempt",
        })
    }
}

/// Module path of a file relative to `frontend/src`.
///
/// `mod.rs`, `lib.rs` and `main.rs` name their directory's module. A
/// `<name>_tests.rs` companion is the `tests` child of `<name>`.
pub(crate) fn module_path(file: &Path) -> Vec<String> {
    let mut segments: Vec<String> = file
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    let Some(leaf) = segments.pop() else {
        return segments;
    };
    let stem = leaf.strip_suffix(".rs").unwrap_or(&leaf);
    if matches!(stem, "mod" | "lib" | "main") {
        return segments;
    }
    let (module, is_companion) = stem
        .strip_suffix("_tests")
        .map_or((stem, false), |parent| (parent, true));
    segments.push(module.to_owned());
    if is_companion {
        segments.push("tests".to_owned());
    }
    segments
}
