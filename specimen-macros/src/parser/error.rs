use proc_macro2::{Span, TokenStream};
use std::fmt;

#[derive(Debug)]
pub struct ParseError {
    message: String,
    span: Option<Span>,
}

impl ParseError {
    #[cfg(test)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }

    #[cfg(test)]
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// Render as a `compile_error!` pointing at the offending doc line
    pub fn to_compile_error(&self) -> TokenStream {
        let span = self.span.unwrap_or_else(Span::call_site);
        syn::Error::new(span, &self.message).to_compile_error()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_error_without_span() {
        let error = ParseError::new("test error");
        assert!(error.span().is_none());
        assert_eq!(error.to_string(), "test error");
    }

    #[test]
    fn creates_error_with_span() {
        let error = ParseError::with_span("test error", Span::call_site());
        assert!(error.span().is_some());
    }

    #[test]
    fn compile_error_carries_message() {
        let error = ParseError::new("Unknown resource annotation '@resorce'");
        let rendered = error.to_compile_error().to_string();
        assert!(rendered.contains("compile_error"));
        assert!(rendered.contains("Unknown resource annotation"));
    }
}
