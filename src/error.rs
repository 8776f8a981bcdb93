use thiserror::Error;

macro_rules! typelib_error {
    // Single string version
    ($kind:ident, $msg:expr) => {
        crate::Error::$kind {
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($kind:ident, $fmt:expr, $($arg:tt)*) => {
        crate::Error::$kind {
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Validation errors follow a flat taxonomy: each variant names one class of structural
/// defect and carries a human-readable message. When a failure occurs while a blob is
/// being validated, the message is prefixed with the validator's breadcrumb context
/// (`In directory (Context: Foo/bar): ...`) identifying the enclosing blobs.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::InvalidHeader`] - Magic, version, size, or fixed-size disagreement
/// - [`Error::TruncatedBuffer`] - Any bounds check that would read past end-of-buffer
/// - [`Error::InvalidDirectory`] - Directory-level issues (locality, alignment, entry type)
/// - [`Error::InvalidBlob`] - Local invariants inside a blob (bad tag, cross-reference out
///   of range, count mismatch, forbidden flag combination)
/// - [`Error::InvalidEntry`] - A blob type tag outside the known range
///
/// ## String Pool Errors
/// - [`Error::InvalidName`] - A name contains characters outside `[A-Za-z0-9_-]`
/// - [`Error::NameTooLong`] - No NUL terminator within the maximum name length
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors while loading a typelib from disk
///
/// # Examples
///
/// ```rust,no_run
/// use typelib::{Error, Typelib};
///
/// match Typelib::from_path(std::path::Path::new("GLib-2.0.typelib")) {
///     Ok(typelib) => {
///         if let Err(Error::InvalidBlob { message }) = typelib.validate() {
///             eprintln!("structurally invalid: {}", message);
///         }
///     }
///     Err(Error::InvalidHeader { message }) => eprintln!("not a typelib: {}", message),
///     Err(e) => eprintln!("error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The fixed header is damaged: bad magic, unsupported version, size field
    /// disagreeing with the buffer length, a blob-size field disagreeing with the
    /// format constants, or a misaligned table offset.
    #[error("Invalid header - {message}")]
    InvalidHeader {
        /// Description of the header defect
        message: String,
    },

    /// A read would have crossed the end of the buffer.
    ///
    /// Every access to the underlying bytes is bounds-checked; this error is the
    /// safety net against attacker-controlled offsets and counts.
    #[error("Buffer too short - {message}")]
    TruncatedBuffer {
        /// Description of the out-of-bounds access
        message: String,
    },

    /// A directory entry violates the directory invariants: wrong locality for its
    /// position, a misaligned blob offset, or an entry-level blob type outside the
    /// permitted range.
    #[error("Invalid directory - {message}")]
    InvalidDirectory {
        /// Description of the directory defect
        message: String,
    },

    /// A blob violates one of its local invariants: a mismatched blob type tag, a
    /// cross-reference index out of range, an inconsistent count, a misaligned
    /// payload, or a forbidden flag combination.
    #[error("Invalid blob - {message}")]
    InvalidBlob {
        /// Description of the blob defect
        message: String,
    },

    /// A name in the string pool contains characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid name - {message}")]
    InvalidName {
        /// Description of the offending name
        message: String,
    },

    /// A name in the string pool has no NUL terminator within [`MAX_NAME_LEN`](crate::MAX_NAME_LEN) bytes.
    #[error("Name too long - {message}")]
    NameTooLong {
        /// Description of the offending name
        message: String,
    },

    /// A blob type tag fell outside the known range while dispatching a directory entry.
    #[error("Invalid entry - {message}")]
    InvalidEntry {
        /// Description of the unknown tag
        message: String,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur when loading a typelib from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Prepend `prefix` to the error message, preserving the error kind.
    ///
    /// Used by the validator to attach the breadcrumb context to failures. I/O
    /// errors pass through unchanged.
    pub(crate) fn prefixed(self, prefix: &str) -> Error {
        match self {
            Error::InvalidHeader { message } => Error::InvalidHeader {
                message: format!("{prefix}{message}"),
            },
            Error::TruncatedBuffer { message } => Error::TruncatedBuffer {
                message: format!("{prefix}{message}"),
            },
            Error::InvalidDirectory { message } => Error::InvalidDirectory {
                message: format!("{prefix}{message}"),
            },
            Error::InvalidBlob { message } => Error::InvalidBlob {
                message: format!("{prefix}{message}"),
            },
            Error::InvalidName { message } => Error::InvalidName {
                message: format!("{prefix}{message}"),
            },
            Error::NameTooLong { message } => Error::NameTooLong {
                message: format!("{prefix}{message}"),
            },
            Error::InvalidEntry { message } => Error::InvalidEntry {
                message: format!("{prefix}{message}"),
            },
            Error::FileError(e) => Error::FileError(e),
        }
    }
}
