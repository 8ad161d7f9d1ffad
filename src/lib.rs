//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Library interface for pp - a pull-based C-style text preprocessor
//
// Interprets #-prefixed directives (inclusion, object-like macros,
// conditional compilation, integer expressions, line control), strips
// comments, and hands the result back as a stream of classified tokens
// whose concatenation is the preprocessed output.
//

use std::io::{self, Read, Write};
use std::path::PathBuf;

pub mod error;
mod expr;
mod host;
mod lexer;
mod macros;
mod preprocess;
mod source;
mod token;

pub use error::{Error, ErrorKind, Result};
pub use host::{DirectiveAction, FsHost, Host};
pub use preprocess::Preprocessor;
pub use token::{escape, Token, TokenType};

#[derive(Debug, clap::Parser, Clone, Default)]
#[command(version, about)]
pub struct Args {
    /// `name[=val]`
    ///
    /// Define `name` as `val`, or as the empty string if `=val` is omitted.
    #[arg(short = 'D', long)]
    pub define: Vec<String>,
    /// Undefine `name`.
    #[arg(short = 'U', long)]
    pub undefine: Vec<String>,
    /// Print one classified token per line instead of the preprocessed
    /// text.
    #[arg(short = 't', long)]
    pub tokens: bool,
    /// Input files, processed in order; standard input when empty.
    pub files: Vec<PathBuf>,
}

/// Preprocess the inputs named by `args` and write the token stream to
/// `stdout`.
pub fn run<W: Write>(stdout: &mut W, args: Args) -> io::Result<()> {
    let mut pp = Preprocessor::new();

    for definition in &args.define {
        match definition.split_once('=') {
            Some((name, value)) => pp.define(name, value),
            None => pp.define(definition, ""),
        };
    }
    for name in &args.undefine {
        pp.undef(name);
    }

    if args.files.is_empty() {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        pp.include_string(&src, "stdin");
        emit(&mut pp, stdout, args.tokens)?;
    } else {
        for file in &args.files {
            pp.include_file(&file.to_string_lossy(), false)
                .map_err(into_io)?;
            emit(&mut pp, stdout, args.tokens)?;
        }
    }

    Ok(())
}

/// Drain the preprocessor into `stdout`, either as preprocessed text or as
/// an escaped one-token-per-line dump.
fn emit<W: Write>(pp: &mut Preprocessor, stdout: &mut W, dump_tokens: bool) -> io::Result<()> {
    if dump_tokens {
        while let Some(token) = pp.next_token() {
            writeln!(
                stdout,
                "token_type={}, whitespace=\"{}\", text=\"{}\"",
                token.typ.name(),
                escape(&token.whitespace),
                escape(&token.text)
            )?;
        }
        if let Some(error) = pp.error() {
            return Err(into_io(error.clone()));
        }
    } else {
        let text = pp.read_all().map_err(into_io)?;
        stdout.write_all(text.as_bytes())?;
    }
    Ok(())
}

fn into_io(error: Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error)
}
