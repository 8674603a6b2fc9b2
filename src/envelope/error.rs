use thiserror::Error;

/// Errors raised while rewriting a raw payload into an envelope
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeError {
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("unexpected end of payload at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected literal '{text}' at offset {offset}")]
    UnexpectedLiteral { text: String, offset: usize },

    #[error("trailing data after document at offset {offset}")]
    TrailingData { offset: usize },

    #[error("payload root must be an object, found {found}")]
    RootNotObject { found: &'static str },

    #[error("payload is empty")]
    Empty,
}
