use crate::FilterId;

/// Errors reported by the engine.
///
/// Configuration and host problems surface from [`crate::SmartScroller::new`]. A malformed filter
/// result surfaces from the correction pass that invoked the filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },

    #[error("invalid scroll host: {reason}")]
    InvalidHost { reason: &'static str },

    #[error("filter {filter:?} returned a malformed correction ({height}, {width})")]
    MalformedCorrection {
        filter: FilterId,
        height: f64,
        width: f64,
    },
}

pub type Result<T> = core::result::Result<T, Error>;
