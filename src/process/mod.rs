//! Collaborator processes (installer and script executor)

mod launcher;
mod system;

pub use launcher::{LaunchSpec, ProcessLauncher};
pub use system::SystemLauncher;

#[cfg(test)]
pub(crate) mod testing {
    use super::{LaunchSpec, ProcessLauncher};
    use crate::error::{RunxError, RunxResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory launcher that records every spec it is handed
    #[derive(Default)]
    pub struct RecordingLauncher {
        /// Exit code returned from `run`
        pub exit_code: i32,
        /// Fail `run` as if the program were missing
        pub fail_launch: bool,
        /// Directory created inside the working directory on success
        pub creates_dir: Option<&'static str>,
        /// Canned `capture` output keyed by program
        pub versions: HashMap<String, String>,
        pub calls: Mutex<Vec<LaunchSpec>>,
    }

    impl RecordingLauncher {
        pub fn installer(creates_dir: &'static str) -> Self {
            Self {
                creates_dir: Some(creates_dir),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<LaunchSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessLauncher for RecordingLauncher {
        async fn run(&self, spec: &LaunchSpec) -> RunxResult<i32> {
            self.calls.lock().unwrap().push(spec.clone());
            if self.fail_launch {
                return Err(RunxError::launch(
                    &spec.program,
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
            if let (Some(name), Some(dir), 0) = (self.creates_dir, &spec.current_dir, self.exit_code)
            {
                std::fs::create_dir_all(dir.join(name)).unwrap();
            }
            Ok(self.exit_code)
        }

        async fn capture(&self, spec: &LaunchSpec) -> Option<String> {
            self.versions.get(&spec.program).cloned()
        }
    }
}
