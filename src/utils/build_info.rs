/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub commit: &'static str,
    pub tree: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("HOGAR_BUILD_COMMIT").unwrap_or("unknown"),
        tree: option_env!("HOGAR_BUILD_TREE").unwrap_or("unknown"),
        timestamp: option_env!("HOGAR_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("HOGAR_BUILD_PROFILE").unwrap_or("unknown"),
    }
}
