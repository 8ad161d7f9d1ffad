//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Typed fault codes for the preprocessor
//

/// The class of fault that stopped the token stream.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("syntax error")]
    SyntaxError,
    #[error("unterminated string literal")]
    InvalidString,
    #[error("invalid include path")]
    InvalidPath,
    #[error("expected identifier")]
    ExpectedIdentifier,
    #[error("mismatched conditional directive")]
    MismatchIf,
    #[error("cannot include file")]
    IncludeError,
    #[error("failed to read file")]
    ReadFailed,
    #[error("expression too complex")]
    ExpressionTooComplex,
    #[error("invalid expression")]
    InvalidExpression,
    #[error("division by zero")]
    DivisionByZero,
    #[error("#error directive encountered")]
    ErrorDirective,
}

/// A fault tagged with the source position where it was detected.
///
/// The first fault is sticky: once one is recorded, the preprocessor
/// behaves as if it reached end of input until it is reset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_name}:{line}: {kind}")]
pub struct Error {
    pub kind: ErrorKind,
    pub source_name: String,
    pub line: u32,
}

impl Error {
    pub fn new(kind: ErrorKind, source_name: &str, line: u32) -> Self {
        Self {
            kind,
            source_name: source_name.to_string(),
            line,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
