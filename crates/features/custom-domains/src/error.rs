use std::borrow::Cow;
use vhub_database::DatabaseError;
use vhub_entitlement::EntitlementError;

/// A specialized [`DomainError`] enum of this crate.
#[vhub_derive::vhub_error]
pub enum DomainError {
    /// Malformed or missing input (bad FQDN, blocked domain, bad URLs).
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The domain record does not exist or belongs to another owner.
    #[error("Domain not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The domain name is already registered, to any owner.
    #[error("Domain conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The entitlement gate refused the operation. No DNS I/O was attempted.
    #[error("Plan limit exceeded{}: {message}", format_context(.context))]
    PlanLimitExceeded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// DNS gave no usable answer (timeout, network failure). Retryable,
    /// domain state untouched.
    #[error("DNS verification inconclusive{}: {message}", format_context(.context))]
    DnsTransient { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// DNS answered and the records do not satisfy the challenge.
    #[error("DNS verification failed{}: {message}", format_context(.context))]
    DnsFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for persistence-layer errors.
    #[error("Database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// A wrapper for entitlement provider errors.
    #[error("Entitlement error{}: {source}", format_context(.context))]
    Entitlement {
        #[source]
        source: EntitlementError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal domain error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
