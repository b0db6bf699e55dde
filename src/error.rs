// src/error.rs
//
// Unified error handling for image-scale
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - UserError: Invalid input or precondition violation
// - CodecError: Format/decoding issues
// - ResourceLimit: Memory/dimension limits
// - InternalBug: Library bugs (should not happen)

use std::borrow::Cow;
use thiserror::Error;

/// Error taxonomy used to classify every `ScaleError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Invalid input, recoverable by the caller
    UserError,
    /// Format/decoding issues
    CodecError,
    /// Memory/dimension limits
    ResourceLimit,
    /// Library bugs (should not happen)
    InternalBug,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::UserError => "UserError",
            ErrorCategory::CodecError => "CodecError",
            ErrorCategory::ResourceLimit => "ResourceLimit",
            ErrorCategory::InternalBug => "InternalBug",
        }
    }
}

/// image-scale error types
#[derive(Debug, Error)]
pub enum ScaleError {
    // File I/O Errors
    #[error("File not found: {path}")]
    FileNotFound { path: Cow<'static, str> },

    #[error("Failed to read file '{path}': {source}")]
    FileReadFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    // Decode Errors
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    // Size Limit Errors
    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    #[error("Memory limit of {limit} bytes exceeded while allocating {what} (wanted {requested} bytes)")]
    MemoryLimitExceeded {
        what: Cow<'static, str>,
        requested: u64,
        limit: u64,
    },

    // Operation Errors
    #[error("Invalid resize dimensions: width={width:?}, height={height:?}")]
    InvalidResizeDimensions {
        width: Option<u32>,
        height: Option<u32>,
    },

    #[error("Pixel buffer holds {actual} pixels but {width}x{height} needs {expected}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: u64,
        actual: u64,
    },

    #[error("Unknown resize algorithm: '{name}'. Expected gd, gd_fixed, gm or gm_fixed")]
    UnknownAlgorithm { name: Cow<'static, str> },

    #[error("Unknown filter: '{name}'")]
    UnknownFilter { name: Cow<'static, str> },

    #[error("Filter {filter} has no fixed-point kernel. Only box and triangle are available")]
    UnsupportedFixedFilter { filter: Cow<'static, str> },

    #[error("Invalid value for {name}: {value}. {reason}")]
    InvalidArgument {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

// Constructor Helpers
impl ScaleError {
    pub fn file_not_found(path: impl Into<Cow<'static, str>>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn file_read_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn memory_limit_exceeded(
        what: impl Into<Cow<'static, str>>,
        requested: u64,
        limit: u64,
    ) -> Self {
        Self::MemoryLimitExceeded {
            what: what.into(),
            requested,
            limit,
        }
    }

    pub fn invalid_resize_dimensions(width: Option<u32>, height: Option<u32>) -> Self {
        Self::InvalidResizeDimensions { width, height }
    }

    pub fn buffer_size_mismatch(width: u32, height: u32, actual: usize) -> Self {
        Self::BufferSizeMismatch {
            width,
            height,
            expected: width as u64 * height as u64,
            actual: actual as u64,
        }
    }

    pub fn unknown_algorithm(name: impl Into<Cow<'static, str>>) -> Self {
        Self::UnknownAlgorithm { name: name.into() }
    }

    pub fn unknown_filter(name: impl Into<Cow<'static, str>>) -> Self {
        Self::UnknownFilter { name: name.into() }
    }

    pub fn unsupported_fixed_filter(filter: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFixedFilter {
            filter: filter.into(),
        }
    }

    pub fn invalid_argument(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (caller can fix it)
    ///
    /// Consistent with category(): UserError and ResourceLimit are
    /// recoverable, CodecError and InternalBug are not.
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::ResourceLimit => true,
            ErrorCategory::CodecError | ErrorCategory::InternalBug => false,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. }
            | Self::InvalidResizeDimensions { .. }
            | Self::BufferSizeMismatch { .. }
            | Self::UnknownAlgorithm { .. }
            | Self::UnknownFilter { .. }
            | Self::UnsupportedFixedFilter { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::UserError,

            Self::UnsupportedFormat { .. } | Self::DecodeFailed { .. } => {
                ErrorCategory::CodecError
            }

            // FileReadFailed sits here for the same reason as in most I/O
            // stacks: it usually means a constrained or missing resource.
            Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. }
            | Self::MemoryLimitExceeded { .. }
            | Self::FileReadFailed { .. } => ErrorCategory::ResourceLimit,

            Self::InternalPanic { .. } => ErrorCategory::InternalBug,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, ScaleError>;
