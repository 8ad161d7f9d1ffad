//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Pull-based C-style preprocessor
//
// The preprocessor maintains a stack of source frames (the root input plus
// one frame per active #include), an object-like macro table, and a packed
// conditional-compilation word. `next_token` scans the top frame, strips
// whitespace and comments, interprets directives, expands macros by
// splicing replacement text into the frame buffer, and hands back one
// classified token per call.
//

use crate::error::{Error, ErrorKind, Result};
use crate::expr::ExprEvaluator;
use crate::host::{DirectiveAction, FsHost, Host};
use crate::lexer;
use crate::macros::MacroTable;
use crate::source::{resolve_include, ScanEvent, SourceFrame};
use crate::token::{Token, TokenType};

/// Upper bound on macro splices per pulled token; a self-referential macro
/// would otherwise rescan forever.
const MAX_EXPANSIONS: u32 = 4096;

/// Mask of the topmost conditional group the packed word can hold
/// (21 groups of 3 bits).
const COND_DEPTH_LIMIT_MASK: u64 = 0b111 << 60;

/// Conditional group layout: bit 0 = branch active, bit 1 = a later #elif
/// may still fire, bit 2 = presence sentinel.
const COND_ACTIVE: u64 = 0b001;
const COND_ELIGIBLE: u64 = 0b010;
const COND_PRESENT: u64 = 0b100;

/// True when every bit of every conditional group is set, which is exactly
/// the "emit tokens" state. The empty word (depth 0) passes.
fn all_true(if_bits: u64) -> bool {
    (if_bits.wrapping_add(1) & if_bits) == 0
}

fn line_directive_text(line: u32, source_name: &str) -> String {
    format!("#line {} \"{}\"\n", line, source_name)
}

// ============================================================================
// Preprocessor
// ============================================================================

/// The preprocessor instance.
///
/// Configure it with [`define`](Self::define) / [`undef`](Self::undef),
/// feed it sources with [`include_string`](Self::include_string) or
/// [`include_file`](Self::include_file), then drain it with
/// [`next_token`](Self::next_token) or [`read_all`](Self::read_all).
///
/// The first fault is sticky: `next_token` reports end of input from then
/// on, and [`error`](Self::error) tells a fault apart from a clean EOF.
/// [`reset`](Self::reset) returns the instance to its initial state.
pub struct Preprocessor<H: Host = FsHost> {
    host: H,
    macros: MacroTable,
    stack: Vec<SourceFrame>,
    /// Packed conditional groups, innermost in the low bits.
    if_bits: u64,
    /// A `/* ... */` comment is open across scanner calls.
    inside_comment_block: bool,
    error: Option<Error>,
    /// Macro splices performed while pulling the current token.
    expansions: u32,
}

impl Preprocessor<FsHost> {
    pub fn new() -> Self {
        Self::with_host(FsHost)
    }
}

impl Default for Preprocessor<FsHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Preprocessor<H> {
    pub fn with_host(host: H) -> Self {
        Self {
            host,
            macros: MacroTable::new(),
            stack: Vec::new(),
            if_bits: 0,
            inside_comment_block: false,
            error: None,
            expansions: 0,
        }
    }

    // ========================================================================
    // Macro configuration
    // ========================================================================

    /// Define `name` as `value` (pass "" for a bare flag). Returns true when
    /// an earlier definition was replaced.
    pub fn define(&mut self, name: &str, value: &str) -> bool {
        self.macros.define(name, value)
    }

    /// Remove `name`. Returns true when it was defined.
    pub fn undef(&mut self, name: &str) -> bool {
        self.macros.undef(name)
    }

    /// Remove every macro definition.
    pub fn undef_all(&mut self) {
        self.macros.clear();
    }

    /// Current replacement text of `name`, if defined.
    pub fn find_macro(&self, name: &str) -> Option<&str> {
        self.macros.find(name)
    }

    // ========================================================================
    // Source injection
    // ========================================================================

    /// Push `src` as the new innermost source. Scanning continues there
    /// until it is exhausted, then falls back to the previous source with a
    /// synthesized `#line` restoring the position. Empty input is a no-op.
    pub fn include_string(&mut self, src: &str, source_name: &str) {
        if src.is_empty() {
            return;
        }
        log::debug!("pushing source {source_name:?} ({} bytes)", src.len());
        self.stack
            .push(SourceFrame::new(src.to_string(), source_name, self.if_bits));
    }

    /// Read `path` through the host and push its contents. Relative paths
    /// resolve against the current source's directory unless `is_system`.
    pub fn include_file(&mut self, path: &str, is_system: bool) -> Result<()> {
        let cwd = self
            .stack
            .last()
            .map(|frame| frame.cwd.clone())
            .unwrap_or_default();
        let resolved = resolve_include(&cwd, path, is_system);

        let mut content = String::new();
        if !self.host.read_file(&resolved, &mut content) {
            return Err(Error::new(ErrorKind::ReadFailed, &resolved, 0));
        }
        self.include_string(&content, &resolved);
        Ok(())
    }

    // ========================================================================
    // Observables
    // ========================================================================

    /// Name of the innermost active source, or "" when none remains.
    pub fn current_source_name(&self) -> &str {
        self.stack
            .last()
            .map(|frame| frame.source_name.as_str())
            .unwrap_or("")
    }

    /// 1-based line number within the innermost active source.
    pub fn current_line_number(&self) -> u32 {
        self.stack.last().map(|frame| frame.line_number).unwrap_or(0)
    }

    /// True when no enclosing conditional suppresses token emission.
    pub fn is_inside_true_block(&self) -> bool {
        all_true(self.if_bits)
    }

    /// The sticky fault, if one was recorded.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Drop all sources, macros, conditional state and any recorded fault.
    pub fn reset(&mut self) {
        self.macros.clear();
        self.stack.clear();
        self.if_bits = 0;
        self.inside_comment_block = false;
        self.error = None;
        self.expansions = 0;
    }

    // ========================================================================
    // Token pulling
    // ========================================================================

    /// Pull the next token with macro expansion enabled. Returns None on end
    /// of input or after a fault; check [`error`](Self::error) to tell the
    /// two apart.
    pub fn next_token(&mut self) -> Option<Token> {
        self.next_token_with(true)
    }

    /// Pull the next token, choosing whether identifiers are matched against
    /// the macro table.
    pub fn next_token_with(&mut self, expand_macros: bool) -> Option<Token> {
        if self.error.is_some() {
            return None;
        }
        self.expansions = 0;

        loop {
            match self.scan_next(expand_macros, false) {
                Ok(Some(token)) => {
                    if all_true(self.if_bits) {
                        return Some(token);
                    }
                    // Token inside a false conditional branch: swallow it.
                }
                Ok(None) => return None,
                Err(error) => {
                    log::debug!("fault: {error}");
                    self.error.get_or_insert(error);
                    return None;
                }
            }
        }
    }

    /// Drain the stream and concatenate `whitespace + text` of every token.
    pub fn read_all(&mut self) -> Result<String> {
        let mut output = String::new();
        while let Some(token) = self.next_token() {
            output.push_str(&token.whitespace);
            output.push_str(&token.text);
        }
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(output),
        }
    }

    // ========================================================================
    // Scanning core
    // ========================================================================

    fn top(&self) -> &SourceFrame {
        self.stack.last().expect("source stack is empty")
    }

    fn top_mut(&mut self) -> &mut SourceFrame {
        self.stack.last_mut().expect("source stack is empty")
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        match self.stack.last() {
            Some(frame) => Error::new(kind, &frame.source_name, frame.line_number),
            None => Error::new(kind, "", 0),
        }
    }

    /// Scan one token from the top frame.
    ///
    /// Top-level pulls (`in_directive == false`) pop exhausted frames,
    /// synthesize scheduled `#line` directives and dispatch `#` into the
    /// directive processor. Directive-payload pulls stop at the end of the
    /// current frame, never synthesize, and return `#` as a literal token.
    fn scan_next(&mut self, expand: bool, in_directive: bool) -> Result<Option<Token>> {
        // Start of the pending whitespace run; survives macro splices so the
        // eventual token keeps everything that preceded it.
        let mut ws_start: Option<usize> = None;

        loop {
            if self.stack.is_empty() {
                return Ok(None);
            }

            if !in_directive && self.top().emit_line_directive {
                let frame = self.top_mut();
                frame.emit_line_directive = false;
                let line = frame.emit_line_override.take().unwrap_or(frame.line_number);
                let text = line_directive_text(line, &frame.source_name);
                return Ok(Some(Token::new(TokenType::Directive, String::new(), text)));
            }

            let start = *ws_start.get_or_insert(self.top().cursor);

            let event = {
                let Preprocessor {
                    stack,
                    inside_comment_block,
                    ..
                } = self;
                let frame = stack.last_mut().expect("source stack is empty");
                match frame.skip_whitespace(inside_comment_block) {
                    Ok(event) => event,
                    Err(kind) => {
                        return Err(Error::new(kind, &frame.source_name, frame.line_number))
                    }
                }
            };

            match event {
                ScanEvent::EndOfSource => {
                    if in_directive {
                        return Ok(None);
                    }
                    self.pop_frame()?;
                    ws_start = None;
                }
                ScanEvent::Newline => {
                    let frame = self.top();
                    let whitespace = frame.source[start..frame.cursor - 1].to_string();
                    return Ok(Some(Token::new(
                        TokenType::EndOfLine,
                        whitespace,
                        "\n".to_string(),
                    )));
                }
                ScanEvent::Lexeme => {
                    // Content inside a false conditional region is consumed
                    // without being classified or macro-expanded; only a `#`
                    // still reaches the directive processor.
                    if !in_directive
                        && self.is_skipping()
                        && self.top().source.as_bytes()[self.top().cursor] != b'#'
                    {
                        self.top_mut().skip_dead_text();
                        ws_start = None;
                        continue;
                    }

                    let (typ, len, tok_start) = {
                        let frame = self.top();
                        let tok_start = frame.cursor;
                        match lexer::scan_lexeme(&frame.source[tok_start..]) {
                            Ok((typ, len)) => (typ, len, tok_start),
                            Err(kind) => {
                                return Err(Error::new(
                                    kind,
                                    &frame.source_name,
                                    frame.line_number,
                                ))
                            }
                        }
                    };

                    if typ == TokenType::Directive && !in_directive {
                        let whitespace = {
                            let frame = self.top_mut();
                            frame.cursor += 1;
                            frame.source[start..tok_start].to_string()
                        };
                        if let Some(token) = self.process_directive(whitespace, start)? {
                            return Ok(Some(token));
                        }
                        ws_start = None;
                        continue;
                    }

                    if typ == TokenType::Identifier && expand {
                        let replacement = {
                            let name = &self.top().source[tok_start..tok_start + len];
                            self.macros.find(name).map(str::to_string)
                        };
                        if let Some(value) = replacement {
                            if self.expansions >= MAX_EXPANSIONS {
                                return Err(self.error_here(ErrorKind::ExpressionTooComplex));
                            }
                            self.expansions += 1;
                            let frame = self.top_mut();
                            log::trace!(
                                "expanding {:?} at {}:{}",
                                &frame.source[tok_start..tok_start + len],
                                frame.source_name,
                                frame.line_number
                            );
                            // Splice the replacement over the identifier and
                            // rescan from the splice point; the pending
                            // whitespace run stays put in front of it.
                            frame.source.replace_range(tok_start..tok_start + len, &value);
                            continue;
                        }
                    }

                    let frame = self.top_mut();
                    frame.cursor += len;
                    let text = frame.source[tok_start..tok_start + len].to_string();
                    // Only quoted literals can carry raw newlines.
                    frame.line_number += text.bytes().filter(|&b| b == b'\n').count() as u32;
                    let whitespace = frame.source[start..tok_start].to_string();
                    return Ok(Some(Token::new(typ, whitespace, text)));
                }
            }
        }
    }

    /// Drop the exhausted top frame and schedule a position-restoring
    /// `#line` on the frame below.
    fn pop_frame(&mut self) -> Result<()> {
        let frame = self.stack.pop().expect("source stack is empty");
        log::debug!("popping source {:?}", frame.source_name);
        if self.if_bits != frame.if_bits_on_push {
            return Err(Error::new(
                ErrorKind::MismatchIf,
                &frame.source_name,
                frame.line_number,
            ));
        }
        if let Some(parent) = self.stack.last_mut() {
            parent.emit_line_directive = true;
            parent.emit_line_override = frame.restore_line;
        }
        Ok(())
    }

    // ========================================================================
    // Directive processing
    // ========================================================================

    fn is_skipping(&self) -> bool {
        !all_true(self.if_bits)
    }

    /// Handle one directive. The cursor sits just past the `#`;
    /// `whitespace` is the run that preceded it and `ws_start` its byte
    /// offset in the frame buffer. Returns the token to emit for the
    /// directive, if any.
    fn process_directive(&mut self, whitespace: String, ws_start: usize) -> Result<Option<Token>> {
        // Inside a false region only the conditional family is interpreted.
        // Everything else on the line, well-formed or not, is discarded
        // without tokenizing, and conditional expressions are not evaluated,
        // so faults in skipped branches stay inert.
        if self.is_skipping() {
            let name = self.top_mut().read_dead_directive_name();
            return match name.as_str() {
                "if" | "ifdef" | "ifndef" => {
                    self.skip_dead_line()?;
                    self.push_conditional(false)
                }
                "elif" => self.directive_elif(),
                "else" => self.directive_else(),
                "endif" => self.directive_endif(),
                _ => {
                    self.skip_dead_line()?;
                    Ok(None)
                }
            };
        }

        let name = match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::Identifier => token.text,
            _ => return Err(self.error_here(ErrorKind::ExpectedIdentifier)),
        };
        log::debug!(
            "#{} at {}:{}",
            name,
            self.current_source_name(),
            self.current_line_number()
        );

        match name.as_str() {
            "define" => self.directive_define(whitespace),
            "undef" => self.directive_undef(whitespace),
            "ifdef" => self.directive_ifdef(false),
            "ifndef" => self.directive_ifdef(true),
            "if" => self.directive_if(),
            "elif" => self.directive_elif(),
            "else" => self.directive_else(),
            "endif" => self.directive_endif(),
            "include" => self.directive_include(whitespace, ws_start),
            "line" => self.directive_line(whitespace),
            "eval" => self.directive_eval(whitespace),
            "error" => self.directive_error(),
            _ => self.directive_unknown(whitespace, &name),
        }
    }

    /// Consume the rest of the directive line without tokenizing it.
    /// Discarded payloads need not be well-formed, so nothing is
    /// classified; comments and line numbers are still tracked.
    fn skip_dead_line(&mut self) -> Result<()> {
        loop {
            if self.stack.is_empty() {
                return Ok(());
            }
            let event = {
                let Preprocessor {
                    stack,
                    inside_comment_block,
                    ..
                } = self;
                let frame = stack.last_mut().expect("source stack is empty");
                match frame.skip_whitespace(inside_comment_block) {
                    Ok(event) => event,
                    Err(kind) => {
                        return Err(Error::new(kind, &frame.source_name, frame.line_number))
                    }
                }
            };
            match event {
                ScanEvent::EndOfSource | ScanEvent::Newline => return Ok(()),
                ScanEvent::Lexeme => self.top_mut().skip_dead_text(),
            }
        }
    }

    /// Collect the rest of the directive line; the terminating newline is
    /// consumed but not included.
    fn collect_line(&mut self, expand: bool) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            match self.scan_next(expand, true)? {
                None => return Ok(tokens),
                Some(token) if token.typ == TokenType::EndOfLine => return Ok(tokens),
                Some(token) => tokens.push(token),
            }
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::Identifier => Ok(token.text),
            _ => Err(self.error_here(ErrorKind::ExpectedIdentifier)),
        }
    }

    fn directive_define(&mut self, whitespace: String) -> Result<Option<Token>> {
        let name = self.expect_identifier()?;
        let body = self.collect_line(false)?;
        let value = body
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.macros.define(&name, &value);

        let text = if value.is_empty() {
            format!("#define {}\n", name)
        } else {
            format!("#define {} {}\n", name, value)
        };
        Ok(Some(Token::new(TokenType::Directive, whitespace, text)))
    }

    fn directive_undef(&mut self, whitespace: String) -> Result<Option<Token>> {
        let name = self.expect_identifier()?;
        self.skip_dead_line()?;
        self.macros.undef(&name);
        let text = format!("#undef {}\n", name);
        Ok(Some(Token::new(TokenType::Directive, whitespace, text)))
    }

    /// Open a conditional group. Runs even inside a false region so nesting
    /// stays balanced.
    fn push_conditional(&mut self, active: bool) -> Result<Option<Token>> {
        if self.if_bits & COND_DEPTH_LIMIT_MASK != 0 {
            return Err(self.error_here(ErrorKind::ExpressionTooComplex));
        }
        self.if_bits = (self.if_bits << 3) | COND_PRESENT | COND_ELIGIBLE | active as u64;
        Ok(None)
    }

    fn directive_ifdef(&mut self, negated: bool) -> Result<Option<Token>> {
        let name = self.expect_identifier()?;
        self.skip_dead_line()?;
        let defined = self.macros.find(&name).is_some();
        self.push_conditional(defined != negated)
    }

    fn directive_if(&mut self) -> Result<Option<Token>> {
        let active = self.evaluate_line()? != 0;
        self.push_conditional(active)
    }

    fn directive_elif(&mut self) -> Result<Option<Token>> {
        if self.if_bits == 0 {
            return Err(self.error_here(ErrorKind::MismatchIf));
        }
        let group = self.if_bits & 0b111;
        if group & COND_ACTIVE != 0 || group & COND_ELIGIBLE == 0 {
            // The branch just ended was taken, or an earlier one already
            // was: force false and lock out later branches.
            self.if_bits &= !(COND_ACTIVE | COND_ELIGIBLE);
            self.skip_dead_line()?;
        } else if all_true(self.if_bits >> 3) {
            if self.evaluate_line()? != 0 {
                self.if_bits |= COND_ACTIVE | COND_ELIGIBLE;
            }
        } else {
            self.skip_dead_line()?;
        }
        Ok(None)
    }

    fn directive_else(&mut self) -> Result<Option<Token>> {
        if self.if_bits == 0 {
            return Err(self.error_here(ErrorKind::MismatchIf));
        }
        self.skip_dead_line()?;
        let was_emitting = all_true(self.if_bits);
        self.if_bits ^= COND_ACTIVE;
        if !was_emitting && all_true(self.if_bits) {
            self.top_mut().emit_line_directive = true;
        }
        Ok(None)
    }

    fn directive_endif(&mut self) -> Result<Option<Token>> {
        if self.if_bits == 0 {
            return Err(self.error_here(ErrorKind::MismatchIf));
        }
        self.skip_dead_line()?;
        let was_emitting = all_true(self.if_bits);
        self.if_bits >>= 3;
        if !was_emitting && all_true(self.if_bits) {
            self.top_mut().emit_line_directive = true;
        }
        Ok(None)
    }

    fn directive_include(&mut self, whitespace: String, ws_start: usize) -> Result<Option<Token>> {
        let (path, is_system) = match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::String => {
                let inner = token.text[1..token.text.len() - 1].to_string();
                (inner, false)
            }
            Some(token) if token.typ == TokenType::Less => {
                // Everything up to the closing `>`, whitespace preserved.
                let mut path = String::new();
                loop {
                    match self.scan_next(false, true)? {
                        Some(token) if token.typ == TokenType::Greater => break,
                        Some(token) if token.typ == TokenType::EndOfLine => {
                            return Err(self.error_here(ErrorKind::InvalidPath))
                        }
                        Some(token) => {
                            path.push_str(&token.whitespace);
                            path.push_str(&token.text);
                        }
                        None => return Err(self.error_here(ErrorKind::InvalidPath)),
                    }
                }
                (path, true)
            }
            _ => return Err(self.error_here(ErrorKind::InvalidPath)),
        };

        // Caller position for the restoring book-end, taken before the
        // directive line's newline is consumed.
        let caller_line = self.top().line_number;
        let cwd = self.top().cwd.clone();
        let resolved = resolve_include(&cwd, &path, is_system);
        log::debug!("#include {resolved:?} (system: {is_system})");

        let mut content = String::new();
        if !self.host.read_file(&resolved, &mut content) {
            return Err(self.error_here(ErrorKind::IncludeError));
        }

        // The directive line itself produces no output: consume through its
        // newline, erase it from the buffer, and rewind to the saved
        // whitespace so it is re-consumed after the included frame drains.
        // Newlines hiding in that whitespace (block comments) will be
        // re-counted then.
        self.skip_dead_line()?;
        let frame = self.top_mut();
        frame.source.replace_range(ws_start + whitespace.len()..frame.cursor, "");
        frame.cursor = ws_start;
        frame.line_number -= whitespace.matches('\n').count() as u32;

        if !content.is_empty() {
            self.include_string(&content, &resolved);
            let frame = self.top_mut();
            frame.restore_line = Some(caller_line);
        }
        Ok(None)
    }

    fn directive_line(&mut self, whitespace: String) -> Result<Option<Token>> {
        let line: u32 = match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::Number => token
                .text
                .parse()
                .map_err(|_| self.error_here(ErrorKind::SyntaxError))?,
            _ => return Err(self.error_here(ErrorKind::SyntaxError)),
        };

        let mut name: Option<String> = None;
        loop {
            match self.scan_next(false, true)? {
                None => break,
                Some(token) if token.typ == TokenType::EndOfLine => break,
                Some(token) if token.typ == TokenType::String && name.is_none() => {
                    name = Some(token.text[1..token.text.len() - 1].to_string());
                }
                Some(_) => {}
            }
        }

        // The directive's own newline is consumed above, so the next source
        // line is the one that carries the new number.
        let frame = self.top_mut();
        frame.line_number = line;
        if let Some(name) = name {
            frame.set_source_name(&name);
        }
        let text = line_directive_text(line, &frame.source_name);
        Ok(Some(Token::new(TokenType::Directive, whitespace, text)))
    }

    fn directive_eval(&mut self, whitespace: String) -> Result<Option<Token>> {
        let value = self.evaluate_line()?;
        Ok(Some(Token::new(
            TokenType::Number,
            whitespace,
            value.to_string(),
        )))
    }

    fn directive_error(&mut self) -> Result<Option<Token>> {
        Err(self.error_here(ErrorKind::ErrorDirective))
    }

    fn directive_unknown(&mut self, whitespace: String, name: &str) -> Result<Option<Token>> {
        match self.host.process_unknown_directive(name) {
            DirectiveAction::Keep => Ok(Some(Token::new(
                TokenType::Directive,
                whitespace,
                format!("#{}", name),
            ))),
            DirectiveAction::Drop => Ok(None),
            DirectiveAction::Error => Err(self.error_here(ErrorKind::SyntaxError)),
        }
    }

    // ========================================================================
    // Expression evaluation
    // ========================================================================

    /// Evaluate the rest of the directive line as an integer constant
    /// expression. Macros expand as tokens are pulled; `defined(NAME)`
    /// reads its argument without expansion.
    fn evaluate_line(&mut self) -> Result<i64> {
        let mut evaluator = ExprEvaluator::new();
        loop {
            let Some(token) = self.scan_next(true, true)? else {
                break;
            };
            let step = match token.typ {
                TokenType::EndOfLine => break,
                TokenType::Number => evaluator.push_number(&token.text),
                TokenType::Identifier if token.text == "defined" => {
                    let value = self.read_defined()?;
                    evaluator.push_value(value)
                }
                // Identifiers that survive expansion are undefined names.
                TokenType::Identifier => evaluator.push_value(0),
                typ => evaluator.push_operator(typ),
            };
            step.map_err(|kind| self.error_here(kind))?;
        }
        evaluator.finish().map_err(|kind| self.error_here(kind))
    }

    /// Parse `( NAME )` after a `defined` operator; the name itself must not
    /// be expanded.
    fn read_defined(&mut self) -> Result<i64> {
        match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::ParentLeft => {}
            _ => return Err(self.error_here(ErrorKind::InvalidExpression)),
        }
        let name = match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::Identifier => token.text,
            _ => return Err(self.error_here(ErrorKind::InvalidExpression)),
        };
        match self.scan_next(false, true)? {
            Some(token) if token.typ == TokenType::ParentRight => {}
            _ => return Err(self.error_here(ErrorKind::InvalidExpression)),
        }
        Ok(self.macros.find(&name).is_some() as i64)
    }
}

// ============================================================================
// Tests
// ============================================================================
