// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default label formatting.

extern crate alloc;

use alloc::format;
use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Formats a `[0, 1]` share as a percentage with one decimal, e.g. `0.25` -> `"25.0%"`.
///
/// Ties on the tenths digit round to even.
pub fn format_percent(fraction: f64) -> String {
    let tenths = (fraction * 1000.0).round_ties_even();
    format!("{:.1}%", tenths / 10.0)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn formats_with_one_decimal() {
        assert_eq!(format_percent(0.25), "25.0%", "quarter");
        assert_eq!(format_percent(1.0), "100.0%", "whole");
        assert_eq!(format_percent(0.0), "0.0%", "empty");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%", "third");
        assert_eq!(format_percent(2.0 / 3.0), "66.7%", "two thirds");
    }
}
