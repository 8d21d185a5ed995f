// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers for `no_std` builds.
//!
//! Rounding methods like `f64::ceil` are not available in `core`. Trigonometry goes
//! through `kurbo::Vec2`, which already dispatches to `std` or `libm`; the few
//! remaining operations dispatch here.

/// Float math helpers for `f64` in `no_std` mode.
pub(crate) trait FloatExt {
    fn ceil(self) -> Self;
    fn round_ties_even(self) -> Self;
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
impl FloatExt for f64 {
    fn ceil(self) -> Self {
        libm::ceil(self)
    }

    fn round_ties_even(self) -> Self {
        // `rint` rounds with the default (ties-to-even) rounding mode.
        libm::rint(self)
    }
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("piechart requires either the `std` or `libm` feature");
