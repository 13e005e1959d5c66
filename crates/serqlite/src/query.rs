use std::time::Duration;

use crate::{Arguments, Shape, encode::Encode};

/// Per-call options for the query pipeline.
///
/// ```
/// use std::time::Duration;
/// use serqlite::{QueryOptions, Shape};
///
/// let opts = QueryOptions::new()
///     .bind(42)
///     .bind("name")
///     .shape(Shape::Map)
///     .timeout(Duration::from_secs(2));
/// assert_eq!(opts.arguments.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct QueryOptions {
    /// Positional bind parameters.
    pub arguments: Arguments,
    pub shape: Shape,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional bind parameter.
    pub fn bind<T: Encode>(mut self, value: T) -> Self {
        self.arguments.add(value);
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// How long a server caller waits for its reply, including time spent queued.
    ///
    /// This does not cancel the statement: on expiry the server still runs it to
    /// completion and drops the result. Ignored on a direct [`Connection`](crate::Connection).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
