use miette::Diagnostic;

use thiserror::Error;

pub type Result<T, E = ConstructionFailure> = std::result::Result<T, E>;

/// The factory of a holder failed to build its value.
///
/// The holder that reported this error stays empty, so the next call to
/// `get_value` runs the factory again.
#[derive(Error, Debug, Diagnostic)]
#[error("failed to construct the held value")]
#[diagnostic(
    code("lazyhold::construction-failure"),
    help("the holder is still empty, calling `get_value` again retries the construction")
)]
pub struct ConstructionFailure {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl ConstructionFailure {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl From<anyhow::Error> for ConstructionFailure {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}
