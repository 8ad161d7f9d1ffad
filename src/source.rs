//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Source frames and low-level whitespace/comment scanning
//
// Each frame is one active input: the root string or one `#include` level.
// The frame owns its buffer because macro expansion splices replacement
// text into it in place.
//

use crate::error::ErrorKind;

/// What the whitespace scanner stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanEvent {
    /// A lexeme starts at the cursor.
    Lexeme,
    /// A newline was consumed; the cursor sits just past it.
    Newline,
    /// The frame's buffer is exhausted.
    EndOfSource,
}

/// One entry on the source stack.
#[derive(Debug, Clone)]
pub(crate) struct SourceFrame {
    pub source_name: String,
    /// Directory prefix of `source_name`, used to resolve relative includes.
    pub cwd: String,
    pub source: String,
    /// Byte offset of the next unread character.
    pub cursor: usize,
    /// 1-based; incremented on every consumed newline, comments included.
    pub line_number: u32,
    /// Synthesize a `#line` directive before the next top-level token.
    pub emit_line_directive: bool,
    /// Line to report in that directive instead of the current one;
    /// consumed on emission.
    pub emit_line_override: Option<u32>,
    /// For an `#include` frame, the caller line its drain must restore.
    pub restore_line: Option<u32>,
    /// Conditional state recorded when the frame was pushed; popping with a
    /// different value means a conditional opened inside was never closed.
    pub if_bits_on_push: u64,
}

impl SourceFrame {
    pub fn new(source: String, source_name: &str, if_bits: u64) -> Self {
        Self {
            source_name: source_name.to_string(),
            cwd: derive_cwd(source_name),
            source,
            cursor: 0,
            line_number: 1,
            emit_line_directive: true,
            emit_line_override: None,
            restore_line: None,
            if_bits_on_push: if_bits,
        }
    }

    /// Rename the frame (the `#line` directive does this) and re-derive the
    /// include-resolution directory.
    pub fn set_source_name(&mut self, name: &str) {
        self.source_name = name.to_string();
        self.cwd = derive_cwd(name);
    }

    /// Step over text that is being discarded without tokenizing it, up to
    /// the next byte the scanner must look at again: a directive
    /// introducer, a possible comment opener, or the end of the line. The
    /// byte at the cursor is known not to be any of those (or is a bare
    /// `/`) and is always consumed.
    pub fn skip_dead_text(&mut self) {
        self.cursor += 1;
        while let Some(&c) = self.source.as_bytes().get(self.cursor) {
            match c {
                b'#' | b'/' | b'\n' => break,
                _ => self.cursor += 1,
            }
        }
    }

    /// Read the directive name after a `#` in a region that is being
    /// skipped, stepping over leading blanks. Nothing else is tokenized; a
    /// missing or malformed name comes back empty.
    pub fn read_dead_directive_name(&mut self) -> String {
        while let Some(&c) = self.source.as_bytes().get(self.cursor) {
            if c == b'\n' || c > b' ' {
                break;
            }
            self.cursor += 1;
        }
        let start = self.cursor;
        while let Some(&c) = self.source.as_bytes().get(self.cursor) {
            if !(c.is_ascii_alphanumeric() || c == b'_' || c == b'$') {
                break;
            }
            self.cursor += 1;
        }
        self.source[start..self.cursor].to_string()
    }

    /// Consume whitespace and comments starting at the cursor.
    ///
    /// Whitespace is every byte `<= 0x20` except the newline, plus both
    /// comment styles. A newline outside a block comment terminates the run
    /// and is consumed (`Newline`); newlines inside a block comment only
    /// advance the line counter. A block comment left open at the end of the
    /// buffer is a fault. The caller reconstructs the whitespace text from
    /// the cursor range, so nothing is copied here.
    pub fn skip_whitespace(
        &mut self,
        inside_comment_block: &mut bool,
    ) -> Result<ScanEvent, ErrorKind> {
        let mut in_line_comment = false;
        let mut prev: u8 = 0;

        loop {
            let Some(&c) = self.source.as_bytes().get(self.cursor) else {
                if *inside_comment_block {
                    return Err(ErrorKind::UnexpectedEof);
                }
                return Ok(ScanEvent::EndOfSource);
            };

            if *inside_comment_block {
                self.cursor += 1;
                if c == b'\n' {
                    self.line_number += 1;
                }
                if c == b'/' && prev == b'*' {
                    *inside_comment_block = false;
                    prev = 0;
                } else {
                    prev = c;
                }
                continue;
            }

            if in_line_comment {
                if c == b'\n' {
                    self.cursor += 1;
                    self.line_number += 1;
                    return Ok(ScanEvent::Newline);
                }
                self.cursor += 1;
                continue;
            }

            match c {
                b'\n' => {
                    self.cursor += 1;
                    self.line_number += 1;
                    return Ok(ScanEvent::Newline);
                }
                _ if c <= b' ' => self.cursor += 1,
                b'/' => match self.source.as_bytes().get(self.cursor + 1) {
                    Some(b'/') => {
                        in_line_comment = true;
                        self.cursor += 2;
                    }
                    Some(b'*') => {
                        *inside_comment_block = true;
                        prev = 0;
                        self.cursor += 2;
                    }
                    _ => return Ok(ScanEvent::Lexeme),
                },
                _ => return Ok(ScanEvent::Lexeme),
            }
        }
    }
}

/// Directory prefix of `source_name` up to, but not including, the final
/// `/` or `\`. Empty when the name has no directory part.
pub(crate) fn derive_cwd(source_name: &str) -> String {
    match source_name.rfind(['/', '\\']) {
        Some(pos) => source_name[..pos].to_string(),
        None => String::new(),
    }
}

/// Compose an include target. Quoted includes are resolved relative to the
/// including file's directory; system includes are taken verbatim. All
/// backslashes are rewritten to forward slashes.
pub(crate) fn resolve_include(cwd: &str, path: &str, is_system: bool) -> String {
    let joined = if !is_system && !cwd.is_empty() {
        format!("{}/{}", cwd, path)
    } else {
        path.to_string()
    };
    joined.replace('\\', "/")
}
