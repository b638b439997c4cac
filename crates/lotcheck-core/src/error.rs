use thiserror::Error;

use crate::session::Request;

/// Coarse classification of a failure, used to pick how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad operator input; retry immediately.
    Validation,
    /// Document, code, or lot could not be matched; nothing was mutated.
    Lookup,
    /// Network or remote service failure.
    Transport,
    /// Operation not allowed in the current session state.
    Precondition,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Lookup => "lookup",
            Self::Transport => "transport",
            Self::Precondition => "precondition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("document number is required")]
    EmptyDocument,

    #[error("scan code is required")]
    EmptyScan,

    #[error("quantity must be a positive whole number, got {0:?}")]
    InvalidQuantity(String),

    #[error("order not found or has no items")]
    OrderNotFound,

    #[error("order expands to {units} unit(s), more than the {limit} a check can hold")]
    OrderTooLarge { units: u64, limit: u32 },

    #[error("code {0} is not part of this order")]
    UnknownCode(String),

    #[error("every unit for {0} has already been checked")]
    AlreadyChecked(String),

    #[error("item {item} has outstanding units in several lots ({}); scan the lot code", .lots.join(", "))]
    AmbiguousItem { item: String, lots: Vec<String> },

    #[error("no lot selected; scan a lot or item code first")]
    NoActiveLot,

    #[error("lot {lot} has {available} outstanding unit(s), {requested} requested")]
    InsufficientUnits {
        lot: String,
        available: usize,
        requested: usize,
    },

    #[error("{outstanding} unit(s) still pending")]
    Incomplete { outstanding: usize },

    #[error("no order loaded")]
    NotLoaded,

    #[error("unknown client {0}")]
    UnknownClient(String),

    #[error("invalid client entry {0:?}, expected NAME=OWNER")]
    InvalidClientEntry(String),

    #[error("{} still in flight", .0.as_str())]
    RequestInFlight(Request),
}

impl CheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyDocument
            | Self::EmptyScan
            | Self::InvalidQuantity(_)
            | Self::InvalidClientEntry(_) => ErrorKind::Validation,
            Self::OrderNotFound
            | Self::OrderTooLarge { .. }
            | Self::UnknownCode(_)
            | Self::AlreadyChecked(_)
            | Self::AmbiguousItem { .. }
            | Self::UnknownClient(_) => ErrorKind::Lookup,
            Self::NoActiveLot
            | Self::InsufficientUnits { .. }
            | Self::Incomplete { .. }
            | Self::NotLoaded
            | Self::RequestInFlight(_) => ErrorKind::Precondition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_message_lists_lots() {
        let err = CheckError::AmbiguousItem {
            item: "B2".into(),
            lots: vec!["L1".into(), "L2".into()],
        };
        assert_eq!(
            err.to_string(),
            "item B2 has outstanding units in several lots (L1, L2); scan the lot code"
        );
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn deficit_message_reports_both_counts() {
        let err = CheckError::InsufficientUnits {
            lot: "L1".into(),
            available: 2,
            requested: 3,
        };
        assert_eq!(err.to_string(), "lot L1 has 2 outstanding unit(s), 3 requested");
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn input_errors_are_validation() {
        assert_eq!(CheckError::EmptyDocument.kind(), ErrorKind::Validation);
        assert_eq!(CheckError::EmptyScan.kind(), ErrorKind::Validation);
        assert_eq!(
            CheckError::InvalidQuantity("0".into()).kind(),
            ErrorKind::Validation
        );
    }
}
