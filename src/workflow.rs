use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use crate::engine::{EngineError, ExecutionOptions, ExecutionRequest, ExitSignal, WorkflowEngine};
use crate::engine_resolver;
use crate::schema::OptionSchema;
use crate::settings::Settings;

const EXIT_COLLECTION_NOT_FOUND: i32 = 64;
const EXIT_GENERATOR_NOT_FOUND: i32 = 65;

/// Engine handle backed by the external engine subprocess. Each invocation
/// owns its handles: one for the build phase (schema introspection) and a
/// separate one for the execution phase, bound to that invocation's
/// execution options.
pub struct ProcessEngine {
    binary: PathBuf,
    root: PathBuf,
    execution: ExecutionOptions,
}

impl ProcessEngine {
    /// Build-phase handle, used while the command's flag set is assembled.
    pub fn for_build(settings: &Settings, root: PathBuf) -> anyhow::Result<Self> {
        let binary = engine_resolver::resolve_engine(settings)?;
        Ok(ProcessEngine {
            binary,
            root,
            execution: ExecutionOptions::default(),
        })
    }

    /// Execution-phase handle for one invocation.
    pub fn for_execution(
        settings: &Settings,
        root: PathBuf,
        execution: ExecutionOptions,
    ) -> anyhow::Result<Self> {
        let binary = engine_resolver::resolve_engine(settings)?;
        Ok(ProcessEngine {
            binary,
            root,
            execution,
        })
    }
}

/// On-the-wire form of an [`ExecutionRequest`]. Suppliers are resolved to
/// plain values here: closures cannot cross the process boundary.
#[derive(Serialize)]
struct WireRequest<'a> {
    collection: &'a str,
    generator: &'a str,
    options: &'a BTreeMap<String, Value>,
    execution: ExecutionOptions,
    values: BTreeMap<String, Value>,
}

impl WorkflowEngine for ProcessEngine {
    fn describe_options(
        &self,
        collection: &str,
        generator: &str,
    ) -> Result<OptionSchema, EngineError> {
        let output = Command::new(&self.binary)
            .current_dir(&self.root)
            .args([
                "describe",
                "--collection",
                collection,
                "--generator",
                generator,
            ])
            .output()
            .context("failed to invoke workflow engine")
            .map_err(EngineError::Execution)?;

        match output.status.code() {
            Some(0) => serde_json::from_slice(&output.stdout)
                .context("engine returned a malformed option schema")
                .map_err(EngineError::Execution),
            Some(EXIT_COLLECTION_NOT_FOUND) => {
                Err(EngineError::CollectionNotFound(collection.to_string()))
            }
            Some(EXIT_GENERATOR_NOT_FOUND) => Err(EngineError::GeneratorNotFound {
                collection: collection.to_string(),
                generator: generator.to_string(),
            }),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(EngineError::Execution(anyhow::anyhow!(
                    "engine describe failed: {}",
                    stderr.trim()
                )))
            }
        }
    }

    fn execute(&self, request: ExecutionRequest) -> Result<ExitSignal, EngineError> {
        let wire = WireRequest {
            collection: &request.collection_name,
            generator: &request.generator_name,
            options: &request.generator_options,
            execution: request.execution_options,
            values: request.suppliers.resolve_all(),
        };
        let payload = serde_json::to_vec(&wire)
            .context("failed to encode execution request")
            .map_err(EngineError::Execution)?;

        let mut command = Command::new(&self.binary);
        command.current_dir(&self.root).arg("execute");
        if self.execution.dry_run {
            command.arg("--dry-run");
        }
        if self.execution.force {
            command.arg("--force");
        }

        let mut child = command
            .stdin(Stdio::piped())
            .spawn()
            .context("failed to spawn workflow engine")
            .map_err(EngineError::Execution)?;
        child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Execution(anyhow::anyhow!("engine stdin unavailable")))?
            .write_all(&payload)
            .context("failed to hand request to workflow engine")
            .map_err(EngineError::Execution)?;
        let status = child
            .wait()
            .context("failed to wait for workflow engine")
            .map_err(EngineError::Execution)?;

        Ok(status.code().unwrap_or(1))
    }
}
