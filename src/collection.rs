use crate::settings::Settings;

/// Collection used when neither the invocation nor the settings name one.
pub const DEFAULT_COLLECTION: &str = "@fabrica/workspace";

/// Resolve the effective collection identifier. An explicit identifier wins
/// unchanged; otherwise the configured default; otherwise the built-in one.
/// Missing configuration is never an error.
pub fn resolve(explicit: Option<&str>, settings: &Settings) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    settings
        .generators
        .default_collection
        .clone()
        .unwrap_or_else(|| DEFAULT_COLLECTION.to_string())
}

/// Scan raw argv for `--collection`/`-c` before clap parsing. The flag set
/// of `new` depends on the chosen collection, so this runs at registration
/// time when only the raw argument line exists. The run-time resolution
/// reads the parsed options instead; the two are independently
/// authoritative.
pub fn from_argv<I, S>(args: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--" {
            return None;
        }
        if arg == "--collection" || arg == "-c" {
            return args.next().map(|value| value.as_ref().to_string());
        }
        if let Some(value) = arg.strip_prefix("--collection=") {
            return Some(value.to_string());
        }
        if let Some(value) = arg.strip_prefix("-c=") {
            return Some(value.to_string());
        }
    }
    None
}
