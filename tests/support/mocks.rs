#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use semver::Version;

use fabrica::compat::VersionProbe;
use fabrica::engine::{EngineError, ExecutionRequest, ExitSignal, WorkflowEngine};
use fabrica::schema::OptionSchema;

/// Engine double that records every executed request.
pub struct RecordingEngine {
    executed: Mutex<Vec<ExecutionRequest>>,
    exit: ExitSignal,
}

impl RecordingEngine {
    pub fn with_exit(exit: ExitSignal) -> Self {
        RecordingEngine {
            executed: Mutex::new(Vec::new()),
            exit,
        }
    }

    pub fn executed_requests(&self) -> Vec<ExecutionRequest> {
        self.executed.lock().unwrap().clone()
    }
}

impl WorkflowEngine for RecordingEngine {
    fn describe_options(
        &self,
        _collection: &str,
        _generator: &str,
    ) -> Result<OptionSchema, EngineError> {
        Ok(OptionSchema::default())
    }

    fn execute(&self, request: ExecutionRequest) -> Result<ExitSignal, EngineError> {
        self.executed.lock().unwrap().push(request);
        Ok(self.exit)
    }
}

/// Probe double that counts how often the gate consults it.
pub struct RecordingProbe {
    calls: Mutex<usize>,
    version: Option<Version>,
}

impl RecordingProbe {
    pub fn reporting(version: &str) -> Self {
        RecordingProbe {
            calls: Mutex::new(0),
            version: Some(Version::parse(version).unwrap()),
        }
    }

    pub fn unavailable() -> Self {
        RecordingProbe {
            calls: Mutex::new(0),
            version: None,
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl VersionProbe for RecordingProbe {
    fn installed_version(&self, _root: &Path, _package_manager: &str) -> Option<Version> {
        *self.calls.lock().unwrap() += 1;
        self.version.clone()
    }
}
