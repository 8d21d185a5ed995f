// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-supplied slice data.

extern crate alloc;

use alloc::string::String;

use peniko::Color;

/// One weighted wedge of the pie.
///
/// `id` is an opaque, caller-defined key. It is only ever compared for equality
/// against the currently selected id; it does not need to be unique.
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice<K> {
    /// Selection key.
    pub id: K,
    /// Weight of the slice. Negative (and non-finite) values drop the slice entirely.
    pub value: f64,
    /// Fill color of the wedge.
    pub color: Color,
    /// Label text shown next to the slice when it is selected.
    ///
    /// `None` falls back to the slice's share of the total, e.g. `"25.0%"`.
    pub label: Option<String>,
}

impl<K> PieSlice<K> {
    /// Creates an unlabeled slice.
    pub fn new(id: K, value: f64, color: Color) -> Self {
        Self {
            id,
            value,
            color,
            label: None,
        }
    }

    /// Sets an explicit label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this slice takes part in layout at all.
    pub fn is_retained(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}

impl<K: PartialEq> PieSlice<K> {
    /// Returns `true` if `selected` is `Some` and equal to this slice's id.
    pub fn is_selected_by(&self, selected: Option<&K>) -> bool {
        selected.is_some_and(|id| *id == self.id)
    }
}
