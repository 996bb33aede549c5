use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::schema::OptionSchema;

/// The workspace-creation generator every `fabrica new` invocation targets.
pub const GENERATOR_NEW: &str = "workspace-new";

/// Exit code reported by the engine after a dispatch.
pub type ExitSignal = i32;

pub type Supplier = Arc<dyn Fn() -> Value + Send + Sync>;

/// Key-value table of dynamic value suppliers carried inside an
/// [`ExecutionRequest`]. The engine resolves a supplier whenever a generator
/// template requests its key.
#[derive(Clone, Default)]
pub struct SupplierMap(BTreeMap<String, Supplier>);

impl SupplierMap {
    pub fn new() -> Self {
        SupplierMap::default()
    }

    /// Inserting under a key that already has a supplier keeps the first one,
    /// so repeated insertion is safe.
    pub fn insert(&mut self, key: &str, supplier: Supplier) {
        self.0.entry(key.to_string()).or_insert(supplier);
    }

    pub fn resolve(&self, key: &str) -> Option<Value> {
        self.0.get(key).map(|supplier| supplier())
    }

    pub fn resolve_all(&self) -> BTreeMap<String, Value> {
        self.0
            .iter()
            .map(|(key, supplier)| (key.clone(), supplier()))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SupplierMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// How the engine applies generator effects, as opposed to what the
/// generator itself produces.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionOptions {
    pub dry_run: bool,
    pub force: bool,
    pub interactive: bool,
    pub defaults: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        ExecutionOptions {
            dry_run: false,
            force: false,
            interactive: true,
            defaults: false,
        }
    }
}

/// Everything the engine needs for one generator run. Built once per
/// invocation, handed over by value, never mutated afterwards.
#[derive(Clone, Debug)]
pub struct ExecutionRequest {
    pub collection_name: String,
    pub generator_name: String,
    pub generator_options: BTreeMap<String, Value>,
    pub execution_options: ExecutionOptions,
    pub suppliers: SupplierMap,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("generator `{generator}` not found in collection `{collection}`")]
    GeneratorNotFound {
        collection: String,
        generator: String,
    },
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

/// Seam to the external generator/workflow engine. Build-phase handles serve
/// schema introspection; execution-phase handles serve dispatch. The two are
/// separately owned and never shared.
pub trait WorkflowEngine {
    /// Load `collection` and return the declared option schema of
    /// `generator` within it.
    fn describe_options(
        &self,
        collection: &str,
        generator: &str,
    ) -> Result<OptionSchema, EngineError>;

    /// Run the generator and report its exit signal. The engine's internal
    /// failures are not interpreted here; a non-zero signal is surfaced
    /// as-is.
    fn execute(&self, request: ExecutionRequest) -> Result<ExitSignal, EngineError>;
}
