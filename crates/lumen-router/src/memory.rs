// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host memory detection.

use sysinfo::System;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Memory currently available to new processes, in GB.
///
/// Returns 0.0 when the platform reports nothing, which makes every
/// memory-gated policy ineligible.
pub fn available_memory_gb() -> f64 {
    let mut system = System::new();
    system.refresh_memory();
    bytes_to_gb(system.available_memory())
}

pub(crate) fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_binary_gigabytes() {
        assert_eq!(bytes_to_gb(8 * 1024 * 1024 * 1024), 8.0);
        assert_eq!(bytes_to_gb(0), 0.0);
    }

    #[test]
    fn host_memory_is_non_negative() {
        assert!(available_memory_gb() >= 0.0);
    }
}
