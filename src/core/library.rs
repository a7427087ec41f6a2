use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    AccessDenied {
        message: String,
        reason_code: Option<String>,
    },
    NotFound {
        message: String,
    },
    // This is a retry-able error, which indicates that the store could not apply a change set,
    // e.g. the service throttled the request or another writer changed a staged record since it
    // was read. The caller can re-run the whole operation with or without a backoff.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // A business rule rejected the operation; nothing was written. reason_code holds the
    // first violated rule.
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    // A programming error, e.g. releasing more copies than an item owns. Never retried.
    InvariantViolation {
        message: String,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn access_denied(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::AccessDenied { message: message.to_string(), reason_code }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") {
                LibraryError::access_denied(
                    format!("access-denied error {:?} {:?}", message, reason).as_str(), reason)
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    // rejected builds a validation error tagged with the rule that failed
    pub fn rejected(rule: Rule, message: &str) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code: Some(rule.to_string()) }
    }

    pub fn invariant(message: &str) -> LibraryError {
        LibraryError::InvariantViolation { message: message.to_string() }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::AccessDenied { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Validation { .. } => { false }
            LibraryError::InvariantViolation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }

    // rule returns the violated rule code of a validation error
    pub fn rule(&self) -> Option<&str> {
        match self {
            LibraryError::Validation { reason_code, .. } => reason_code.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::AccessDenied { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::InvariantViolation { message } => {
                write!(f, "invariant violated: {}", message)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for lending operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

// Rule names every business rule that can reject an operation.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Rule {
    EmptyItemList,
    DuplicateItem,
    PatronNotFound,
    PatronInactive,
    MembershipExpired,
    AnnualFeeUnpaid,
    BorrowLimitExceeded,
    ItemNotFound,
    ItemDeleted,
    RestrictedItem,
    NoCopyAvailable,
    TicketNotFound,
    TicketNotBorrowed,
    TicketHasReturns,
    ItemNotOnTicket,
    ItemNotOutstanding,
    ReservationPending,
    AlreadyExtended,
    ReservationLimitReached,
    ItemAvailable,
    ItemAlreadyHeld,
    ItemAlreadyReserved,
    ReservationNotPending,
    ReservationNotReady,
    ReservationLapsed,
    CopiesOnLoan,
    PatronHasLoans,
    PatronNotRestorable,
    FineOutstanding,
    InvalidField,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::EmptyItemList => "empty_item_list",
            Rule::DuplicateItem => "duplicate_item",
            Rule::PatronNotFound => "patron_not_found",
            Rule::PatronInactive => "patron_inactive",
            Rule::MembershipExpired => "membership_expired",
            Rule::AnnualFeeUnpaid => "annual_fee_unpaid",
            Rule::BorrowLimitExceeded => "borrow_limit_exceeded",
            Rule::ItemNotFound => "item_not_found",
            Rule::ItemDeleted => "item_deleted",
            Rule::RestrictedItem => "restricted_item",
            Rule::NoCopyAvailable => "no_copy_available",
            Rule::TicketNotFound => "ticket_not_found",
            Rule::TicketNotBorrowed => "ticket_not_borrowed",
            Rule::TicketHasReturns => "ticket_has_returns",
            Rule::ItemNotOnTicket => "item_not_on_ticket",
            Rule::ItemNotOutstanding => "item_not_outstanding",
            Rule::ReservationPending => "reservation_pending",
            Rule::AlreadyExtended => "already_extended",
            Rule::ReservationLimitReached => "reservation_limit_reached",
            Rule::ItemAvailable => "item_available",
            Rule::ItemAlreadyHeld => "item_already_held",
            Rule::ItemAlreadyReserved => "item_already_reserved",
            Rule::ReservationNotPending => "reservation_not_pending",
            Rule::ReservationNotReady => "reservation_not_ready",
            Rule::ReservationLapsed => "reservation_lapsed",
            Rule::CopiesOnLoan => "copies_on_loan",
            Rule::PatronHasLoans => "patron_has_loans",
            Rule::PatronNotRestorable => "patron_not_restorable",
            Rule::FineOutstanding => "fine_outstanding",
            Rule::InvalidField => "invalid_field",
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum PatronStatus {
    Active,
    Suspended,
    Expired,
}

impl Display for PatronStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PatronStatus::Active => write!(f, "Active"),
            PatronStatus::Suspended => write!(f, "Suspended"),
            PatronStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum ItemStatus {
    Available,
    Unavailable,
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ItemStatus::Available => write!(f, "Available"),
            ItemStatus::Unavailable => write!(f, "Unavailable"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum TicketStatus {
    Borrowed,
    Returned,
}

impl Display for TicketStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TicketStatus::Borrowed => write!(f, "Borrowed"),
            TicketStatus::Returned => write!(f, "Returned"),
        }
    }
}

// LoanStatus is the state of one line of a patron's borrow history
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Cancelled,
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LoanStatus::Borrowed => write!(f, "Borrowed"),
            LoanStatus::Returned => write!(f, "Returned"),
            LoanStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Ready,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    // active reservations occupy the single hold slot of their item
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Ready)
    }
}

impl Display for ReservationStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "Pending"),
            ReservationStatus::Ready => write!(f, "Ready"),
            ReservationStatus::Completed => write!(f, "Completed"),
            ReservationStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}
