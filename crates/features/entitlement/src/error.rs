use std::borrow::Cow;

/// A specialized [`EntitlementError`] enum of this crate.
#[vhub_derive::vhub_error]
pub enum EntitlementError {
    /// Validation errors (malformed owner IDs, inconsistent inputs).
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A limit or usage provider failed to answer.
    #[error("Provider error{}: {message}", format_context(.context))]
    Provider { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal entitlement error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
