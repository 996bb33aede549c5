use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::collection;
use crate::compat::{self, VersionProbe};
use crate::engine::{
    ExecutionOptions, ExecutionRequest, ExitSignal, GENERATOR_NEW, SupplierMap, WorkflowEngine,
};
use crate::settings::Settings;
use crate::version::{VERSION, VERSION_SUPPLIER_KEY};

/// Execution-mode keys reserved for the engine; together with `collection`
/// they are stripped from the generator options.
pub const EXECUTION_KEYS: [&str; 4] = ["dry-run", "force", "interactive", "defaults"];

/// Read the execution-mode entries without consuming the option map.
pub fn execution_view(options: &BTreeMap<String, Value>) -> ExecutionOptions {
    ExecutionOptions {
        dry_run: bool_option(options, "dry-run", false),
        force: bool_option(options, "force", false),
        interactive: bool_option(options, "interactive", true),
        defaults: bool_option(options, "defaults", false),
    }
}

/// Split resolved options into execution-mode controls, the collection
/// override, and the generator options. Exhaustive and disjoint: every input
/// key lands in exactly one of the three.
pub fn partition_options(
    mut options: BTreeMap<String, Value>,
) -> (ExecutionOptions, Option<String>, BTreeMap<String, Value>) {
    let execution = execution_view(&options);
    for key in EXECUTION_KEYS {
        options.remove(key);
    }
    let collection = options
        .remove("collection")
        .and_then(|value| value.as_str().map(str::to_string));
    (execution, collection, options)
}

/// Dispatch one `new` invocation: resolve the collection, gate on the
/// environment, partition the options, and hand the request to the engine.
/// The engine's exit signal is returned as-is; its internal failures are not
/// interpreted here. Idle until called, dispatched once, no re-entry.
pub fn run(
    engine: &dyn WorkflowEngine,
    probe: &dyn VersionProbe,
    settings: &Settings,
    root: &Path,
    options: BTreeMap<String, Value>,
) -> anyhow::Result<ExitSignal> {
    let collection_name = collection::resolve(
        options.get("collection").and_then(Value::as_str),
        settings,
    );

    let mut suppliers = SupplierMap::new();
    suppliers.insert(
        VERSION_SUPPLIER_KEY,
        Arc::new(|| Value::String(VERSION.to_string())),
    );

    compat::check_compatibility(&collection_name, &options, settings, root, probe)?;

    let (execution_options, _, generator_options) = partition_options(options);
    let request = ExecutionRequest {
        collection_name,
        generator_name: GENERATOR_NEW.to_string(),
        generator_options,
        execution_options,
        suppliers,
    };
    tracing::debug!(
        collection = %request.collection_name,
        generator = %request.generator_name,
        dry_run = request.execution_options.dry_run,
        "dispatching workspace generator"
    );
    Ok(engine.execute(request)?)
}

fn bool_option(options: &BTreeMap<String, Value>, key: &str, default: bool) -> bool {
    options
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or(default)
}
