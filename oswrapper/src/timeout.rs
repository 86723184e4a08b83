//! Bounded-wait abstraction used by every blocking OSW operation.

/// How long a blocking call is willing to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Never block; equivalent to a `try_*` call.
    Polling,
    /// Block until the condition is satisfied, however long that takes.
    Forever,
    /// Block for at most this many milliseconds.
    Millis(u32),
}

impl Timeout {
    #[inline]
    pub const fn is_polling(self) -> bool {
        matches!(self, Timeout::Polling)
    }

    #[inline]
    pub const fn is_forever(self) -> bool {
        matches!(self, Timeout::Forever)
    }

    /// Milliseconds remaining, or `None` for [`Timeout::Forever`].
    #[inline]
    pub const fn as_millis(self) -> Option<u32> {
        match self {
            Timeout::Polling => Some(0),
            Timeout::Forever => None,
            Timeout::Millis(ms) => Some(ms),
        }
    }
}
