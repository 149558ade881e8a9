use std::path::PathBuf;

/// Errors raised while wiring up the bridge. Failures of individual engine
/// calls are reported through their boolean or sentinel results instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("native engine unavailable at {path:?}: {source}")]
    BackendUnavailable {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("native engine at {path:?} is missing symbol {symbol}: {source}")]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

impl BridgeError {
    /// Both variants mean no engine call can be made.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable { .. } | Self::MissingSymbol { .. }
        )
    }
}
