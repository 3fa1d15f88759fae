use std::borrow::Cow;
use vhub_derive::vhub_error;

#[vhub_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: DemoError = "boom".into();
    let _ = err.to_string();

    let io: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    let with_context: Result<(), DemoError> = io.context("reading config");
    assert!(with_context.is_err());
}
