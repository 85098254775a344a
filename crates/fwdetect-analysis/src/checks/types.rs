use smallvec::SmallVec;

/// Result of a check's evaluation function.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome<E> {
    /// The fact was found; `E` is the supporting evidence.
    Passed(E),
    Failed,
    /// The function observed cancellation and stopped.
    Canceled,
}

impl<E> CheckOutcome<E> {
    /// `Passed(evidence)` if found, `Failed` otherwise.
    pub fn from_option(evidence: Option<E>) -> Self {
        match evidence {
            Some(e) => Self::Passed(e),
            None => Self::Failed,
        }
    }
}

/// Argument type of a check kind.
///
/// `validate` runs when a detector is built, so a bad signature argument is
/// a configuration error rather than a failed check.
pub trait CheckArgs: Send + Sync + 'static {
    /// Short text interpolated into the registration's description template.
    fn describe(&self) -> String;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Fact ids this argument reads in addition to the registration's own.
    fn extra_fact_ids(&self) -> SmallVec<[String; 2]> {
        SmallVec::new()
    }
}
