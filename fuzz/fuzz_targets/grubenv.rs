// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

#![no_main]

use blscan_core::config::parsers::grubenv::GrubEnv;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = str::from_utf8(data) {
        let env = GrubEnv::new(content);
        let _ = env.expand(content);
    }
});
