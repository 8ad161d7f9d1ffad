//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Collaborator seam between the preprocessor and its environment
//

use std::fs;

/// What to do with a directive the preprocessor does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveAction {
    /// Emit the directive token; the rest of the line is tokenized normally.
    Keep,
    /// Suppress the directive token; the rest of the line is tokenized
    /// normally.
    Drop,
    /// Treat the directive as a fault.
    Error,
}

/// Services the preprocessor asks its environment for.
///
/// The default methods read from the real filesystem and keep unknown
/// directives, so a unit struct implementing `Host` with no overrides
/// behaves like [`FsHost`].
pub trait Host {
    /// Read the file at `path` into `output`. Returns false on failure.
    fn read_file(&mut self, path: &str, output: &mut String) -> bool {
        match fs::read_to_string(path) {
            Ok(content) => {
                *output = content;
                true
            }
            Err(error) => {
                log::debug!("read_file {path:?} failed: {error}");
                false
            }
        }
    }

    /// Decide what happens to an unrecognized `#name` directive.
    fn process_unknown_directive(&mut self, name: &str) -> DirectiveAction {
        let _ = name;
        DirectiveAction::Keep
    }
}

/// Default host: real filesystem, unknown directives kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsHost;

impl Host for FsHost {}
