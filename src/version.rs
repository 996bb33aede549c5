/// Version string of the running fabrica binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supplier key under which generator templates can request the CLI version.
pub const VERSION_SUPPLIER_KEY: &str = "cli-version";
