//! Distinguished failure kinds raised by the channel kernel and the ALT engine.
use std::fmt;
use std::io;
use std::sync::PoisonError;

/// Failure kinds produced by channel, mutex and ALT operations.
///
/// Channel poison (a sticky end-of-channel condition, see [`crate::channel`])
/// and lock poisoning (a panicking thread holding a `std::sync` lock) are
/// unrelated concepts that happen to share the English word; [`ChannelError::Poisoned`]
/// is the former, [`ChannelError::Internal`] covers the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Raised on an end whose channel poison strength exceeds that end's immunity.
    Poisoned {
        /// The poison strength observed at the time of the raise.
        strength: u32,
    },
    /// The calling thread was asked to stop while blocked in a channel operation.
    Interrupted,
    /// Programmer error: mounting a read guard on a shared read end, or two
    /// ALTs registering concurrently on the same channel.
    MisuseAlt(&'static str),
    /// A buffered channel was asked for but no `DataStore` was supplied.
    NullStore,
    /// An invariant internal to the kernel was violated (e.g. a poisoned
    /// `std::sync` lock, or a `DataStore` invariant failure).
    Internal(&'static str),
    /// A `TimeoutGuard` or ALT deadline elapsed before anything became ready.
    Timeout,
    /// A non-blocking operation found nothing to do.
    WouldBlock,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisoned { strength } => {
                write!(f, "channel end is poisoned (strength {strength})")
            }
            Self::Interrupted => write!(f, "process interrupted while blocked in channel op"),
            Self::MisuseAlt(msg) => write!(f, "ALT misuse: {msg}"),
            Self::NullStore => write!(f, "buffered channel constructed without a DataStore"),
            Self::Internal(msg) => write!(f, "internal invariant violation: {msg}"),
            Self::Timeout => write!(f, "timed out"),
            Self::WouldBlock => write!(f, "operation would block"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<ChannelError> for io::Error {
    fn from(err: ChannelError) -> Self {
        let kind = match err {
            ChannelError::Poisoned { .. } => io::ErrorKind::BrokenPipe,
            ChannelError::Interrupted => io::ErrorKind::Interrupted,
            ChannelError::Timeout => io::ErrorKind::TimedOut,
            ChannelError::WouldBlock => io::ErrorKind::WouldBlock,
            ChannelError::MisuseAlt(_) | ChannelError::NullStore | ChannelError::Internal(_) => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, err)
    }
}

/// Internal result type used by the monitor, ALT and poison modules. Public
/// channel-end operations convert this to `io::Result` at the API boundary,
/// keeping the internal error type out of the public surface.
pub(crate) type Result<T> = std::result::Result<T, ChannelError>;

/// Folds a poisoned `std::sync` lock into `ChannelError::Internal`. Named
/// distinctly from channel poison so the two concepts never get confused at
/// a call site.
pub(crate) fn lock_result<G>(result: std::result::Result<G, PoisonError<G>>) -> Result<G> {
    result.map_err(|_| ChannelError::Internal("underlying std::sync lock was poisoned"))
}
