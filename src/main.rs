//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    env_logger::init();
    let args = posixutils_pp::Args::parse();

    let mut stdout = std::io::stdout();
    match posixutils_pp::run(&mut stdout, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("pp: {error}");
            ExitCode::FAILURE
        }
    }
}
