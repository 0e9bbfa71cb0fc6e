use thiserror::Error;

/// What went wrong while reading a calendar document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Input was empty or contained only blank lines
    #[error("empty calendar document")]
    EmptyInput,
    /// Expected a `BEGIN:` line
    #[error("expected BEGIN line")]
    MissingBegin,
    /// A component was never closed
    #[error("unterminated component")]
    MissingEnd,
    /// `END:` did not match the open component
    #[error("mismatched END line")]
    MismatchedComponent,
    /// Content line has no `:` separating name and value
    #[error("missing ':' in content line")]
    MissingColon,
    /// Content line starts with `:` or `;`
    #[error("missing property name")]
    MissingPropertyName,
    /// Property name contains characters outside `[A-Za-z0-9-]`
    #[error("invalid property name")]
    InvalidPropertyName,
    /// Malformed `;NAME=value` parameter
    #[error("invalid property parameter")]
    InvalidParameter,
    /// Quoted parameter value is never closed
    #[error("unclosed quoted parameter value")]
    UnclosedQuote,
    /// `VERSION` is present but is not `2.0`
    #[error("unsupported calendar version")]
    UnsupportedVersion,
    /// Non-blank content after `END:VCALENDAR`
    #[error("content after END:VCALENDAR")]
    TrailingContent,
}

/// A calendar document could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}{}", context_suffix(.context))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number in the folded source text
    pub line: usize,
    pub context: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_context() {
        let bare = ParseError::new(ParseErrorKind::MissingEnd, 4);
        assert_eq!(bare.to_string(), "unterminated component at line 4");

        let detailed = ParseError::new(ParseErrorKind::MismatchedComponent, 9)
            .with_context("expected END:VALARM, got END:VEVENT");
        assert_eq!(
            detailed.to_string(),
            "mismatched END line at line 9 (expected END:VALARM, got END:VEVENT)"
        );
    }
}
