// Engine backed by the external `rrdtool` binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{CreateRequest, EngineError, RrdEngine, SampleRow};

#[derive(Debug, Clone)]
pub struct RrdtoolCli {
    program: PathBuf,
}

impl Default for RrdtoolCli {
    fn default() -> Self {
        Self::new("rrdtool")
    }
}

impl RrdtoolCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, operation: &'static str, args: Vec<OsString>) -> Result<(), EngineError> {
        let output = Command::new(&self.program)
            .arg(operation)
            .args(args)
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(EngineError::Failed {
                operation,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl RrdEngine for RrdtoolCli {
    fn create(&self, request: &CreateRequest) -> Result<(), EngineError> {
        let mut args: Vec<OsString> = vec![request.path.clone().into_os_string()];
        args.extend(request.to_args().into_iter().skip(1).map(OsString::from));
        self.run("create", args)
    }

    fn update(&self, path: &Path, row: &SampleRow) -> Result<(), EngineError> {
        self.run(
            "update",
            vec![path.as_os_str().to_owned(), OsString::from(row.to_string())],
        )
    }
}
