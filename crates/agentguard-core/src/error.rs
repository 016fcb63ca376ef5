use http::StatusCode;

/// An error that knows how it should look on the wire
///
/// The HTTP boundary renders implementors as an `OpenAI`-style
/// `{"error": {"message", "type", "code"}}` body.
pub trait HttpError: std::error::Error {
    /// Response status
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `policy_error`)
    fn error_type(&self) -> &str;

    /// Stable machine-readable error code (e.g. `policy_denied`)
    fn error_code(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}
