// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Parses configuration files into [`crate::image::BootImage`].
//!
//! The currently supported formats are as follows:
//! - BLS Config files (also known as BLS Type 1)
//! - The GRUB environment block, for variables referenced by BLS options

/// The BLS (BLS type 1) parser.
pub mod bls;

/// The GRUB environment block parser.
pub mod grubenv;
