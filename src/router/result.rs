use crate::error::{AppError, AppResult, TargetFailure};

/// Outcome of dispatching to one input address
#[derive(Debug)]
pub struct DispatchResult {
    /// Position of the address in the caller's input
    pub index: usize,
    /// Scheme as written in the address (empty if it could not be parsed)
    pub scheme: String,
    /// The address with its password replaced by `REDACTED`
    pub address: String,
    pub outcome: AppResult<()>,
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn is_canceled(&self) -> bool {
        self.outcome.as_ref().err().is_some_and(AppError::is_canceled)
    }

    pub fn error(&self) -> Option<&AppError> {
        self.outcome.as_ref().err()
    }
}

/// Per-address outcomes of a send, in input order
#[derive(Debug, Default)]
pub struct DispatchReport {
    results: Vec<DispatchResult>,
}

impl DispatchReport {
    pub(crate) fn new(results: Vec<DispatchResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[DispatchResult] {
        &self.results
    }

    pub fn successes(&self) -> impl Iterator<Item = &DispatchResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether at least one address failed
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Converts an all-failed report into its aggregate error
    pub(crate) fn into_result(self) -> AppResult<Self> {
        if self.results.is_empty() || self.successes().next().is_some() {
            return Ok(self);
        }

        let failures = self
            .results
            .into_iter()
            .filter_map(|result| {
                let DispatchResult {
                    index,
                    scheme,
                    address,
                    outcome,
                } = result;
                outcome.err().map(|error| TargetFailure {
                    index,
                    scheme,
                    address,
                    error,
                })
            })
            .collect();
        Err(AppError::AllTargetsFailed { failures })
    }
}

impl IntoIterator for DispatchReport {
    type Item = DispatchResult;
    type IntoIter = std::vec::IntoIter<DispatchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
