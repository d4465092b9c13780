// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

#![no_main]

use std::path::Path;

use blscan_core::config::parsers::bls::ConfigEntry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(entry) = ConfigEntry::from_bytes(data) {
        let _ = entry.into_image("fuzz", Path::new("/fuzz.conf"), Path::new("/"), None);
    }
});
