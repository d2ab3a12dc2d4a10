//! Ambient CI job context.
//!
//! When a deployment runs inside the hub's CI, these identifiers are injected
//! into the process environment and forwarded with every transaction
//! registration so the hub can map the signing job back to its pipeline.

use std::env;

/// Environment variable carrying the project identifier.
pub const PROJECT_ID_ENVVAR: &str = "SUPER_PROJECT_ID";

/// Environment variable carrying the build configuration identifier.
pub const BUILD_CONFIG_ID_ENVVAR: &str = "SUPER_BUILD_CONFIG_ID";

/// Environment variable carrying the CI job identifier.
pub const CI_JOB_ID_ENVVAR: &str = "CI_JOB_ID";

/// The build/job/project identifiers sourced from the execution environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobContext {
    /// The project the deployment belongs to.
    pub project_id: Option<String>,

    /// The build configuration being executed.
    pub build_config_id: Option<String>,

    /// The CI job executing the deployment.
    pub ci_job_id: Option<String>,
}

impl JobContext {
    /// Reads the job context from the standard environment variables.
    ///
    /// Missing variables are left unset rather than treated as errors; the
    /// hub decides whether it requires them.
    pub fn from_env() -> Self {
        Self {
            project_id: env::var(PROJECT_ID_ENVVAR).ok(),
            build_config_id: env::var(BUILD_CONFIG_ID_ENVVAR).ok(),
            ci_job_id: env::var(CI_JOB_ID_ENVVAR).ok(),
        }
    }
}
