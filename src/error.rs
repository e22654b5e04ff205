use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScourError {
    // Session lifecycle
    #[error("session already running or finished")]
    AlreadyRunning,

    // Config
    #[error("no search targets provided")]
    NoTargets,

    #[error("empty search target")]
    EmptyTarget,

    #[error("invalid worker count")]
    InvalidWorkerCount(usize),

    #[error("invalid file size limit")]
    InvalidSizeLimit(f64),

    // Runtime
    #[error("failed to spawn thread")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

impl ScourError {
    /// Whether this error was caused by the supplied configuration rather
    /// than by the runtime. Config errors are fixable by the caller before
    /// retrying with a fresh session; runtime errors generally are not.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::NoTargets
                | Self::EmptyTarget
                | Self::InvalidWorkerCount(_)
                | Self::InvalidSizeLimit(_)
        )
    }
}
