//! Simon Says firmware library - board logic that can be tested on the host.
//!
//! The binary (`main.rs`) wires these modules to embassy drivers; everything
//! in here is plain arithmetic and byte layout with no hardware access.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p simon-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p simon-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod battery;
pub mod board;
pub mod flash_layout;
pub mod sound;
