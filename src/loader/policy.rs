use crate::error::{LoadError, LoadResult};
use std::io::Write;

/// How a loader deals with a failed load
///
/// In reraise mode the [`LoadError`] is returned to the caller. Otherwise the
/// loader returns `Ok(false)` and, if a sink is set, writes one line with the
/// error to it.
#[derive(Default)]
pub struct ErrorPolicy<'a> {
    pub reraise: bool,
    pub sink: Option<&'a mut (dyn Write + Send)>,
}

impl<'a> ErrorPolicy<'a> {
    /// Return errors to the caller.
    pub fn reraise() -> Self {
        ErrorPolicy {
            reraise: true,
            sink: None,
        }
    }

    /// Write errors to `sink` and report failure as `Ok(false)`.
    pub fn report_to(sink: &'a mut (dyn Write + Send)) -> Self {
        ErrorPolicy {
            reraise: false,
            sink: Some(sink),
        }
    }

    /// Turn the outcome of a load into the value the public loaders return.
    pub fn settle(self, outcome: LoadResult<()>) -> LoadResult<bool> {
        let err = match outcome {
            Ok(()) => return Ok(true),
            Err(err) => err,
        };

        if self.reraise {
            return Err(err);
        }

        tracing::debug!(error = %err, "load failed");
        if let Some(sink) = self.sink {
            // Write errors on the sink are ignored.
            let _ = writeln!(sink, "{}", err);
        }
        Ok(false)
    }
}

impl std::fmt::Debug for ErrorPolicy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPolicy")
            .field("reraise", &self.reraise)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> LoadResult<()> {
        Err(LoadError::NotAnObject {
            location: "data.json".to_string(),
        })
    }

    #[test]
    fn test_success_is_true_in_every_mode() {
        let mut sink = Vec::new();
        assert_eq!(ErrorPolicy::default().settle(Ok(())), Ok(true));
        assert_eq!(ErrorPolicy::reraise().settle(Ok(())), Ok(true));
        assert_eq!(ErrorPolicy::report_to(&mut sink).settle(Ok(())), Ok(true));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_reraise_returns_error() {
        assert_eq!(ErrorPolicy::reraise().settle(failure()), failure().map(|_| true));
    }

    #[test]
    fn test_report_writes_to_sink() {
        let mut sink = Vec::new();
        assert_eq!(ErrorPolicy::report_to(&mut sink).settle(failure()), Ok(false));
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "Invalid JSON in 'data.json': root must be an object\n"
        );
    }

    #[test]
    fn test_silent_policy() {
        assert_eq!(ErrorPolicy::default().settle(failure()), Ok(false));
    }
}
