// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label measurement with caching.
//!
//! Label extents decide how much of the canvas the pie may use, so every
//! geometry rebuild needs the size of every label. Percent labels repeat a lot
//! (`"25.0%"` four times for an even split) and explicit labels rarely change
//! between rebuilds, so sizes are memoized per label string.

extern crate alloc;

use alloc::string::String;

use hashbrown::HashMap;
use kurbo::Size;
use piechart_text::{TextMeasurer, TextStyle};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Converts raw metrics into the whole-pixel box a label occupies.
///
/// Extents are rounded up so a label never spills past the space reserved for it.
pub fn label_size(measurer: &impl TextMeasurer, text: &str, style: &TextStyle) -> Size {
    if text.is_empty() {
        return Size::ZERO;
    }
    let metrics = measurer.measure(text, style).sanitized();
    Size::new(
        metrics.advance_width.ceil(),
        metrics.line_height().ceil(),
    )
}

/// Memoized [`label_size`] for a single label style.
#[derive(Clone, Debug, Default)]
pub struct LabelCache {
    style: TextStyle,
    sizes: HashMap<String, Size>,
}

impl LabelCache {
    /// Creates an empty cache for labels drawn in `style`.
    pub fn new(style: TextStyle) -> Self {
        Self {
            style,
            sizes: HashMap::new(),
        }
    }

    /// The style labels are measured in.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Switches label style. Cached sizes are dropped if the style actually changed.
    ///
    /// Returns `true` if the cache was invalidated.
    pub fn set_style(&mut self, style: &TextStyle) -> bool {
        if self.style == *style {
            return false;
        }
        self.style = style.clone();
        self.sizes.clear();
        true
    }

    /// Returns the size of `text`, measuring it on first use.
    pub fn measure(&mut self, measurer: &impl TextMeasurer, text: &str) -> Size {
        if let Some(size) = self.sizes.get(text) {
            return *size;
        }
        let size = label_size(measurer, text, &self.style);
        self.sizes.insert(String::from(text), size);
        size
    }

    /// Forgets every cached label for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.sizes.retain(|text, _| keep(text));
    }

    /// Number of distinct labels currently cached.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether nothing has been measured yet.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::Cell;

    use piechart_text::{HeuristicTextMeasurer, TextMetrics};

    use super::*;

    #[derive(Default)]
    struct CountingMeasurer {
        calls: Cell<usize>,
    }

    impl TextMeasurer for CountingMeasurer {
        fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
            self.calls.set(self.calls.get() + 1);
            HeuristicTextMeasurer.measure(text, style)
        }
    }

    struct FractionalMeasurer;

    impl TextMeasurer for FractionalMeasurer {
        fn measure(&self, _text: &str, _style: &TextStyle) -> TextMetrics {
            TextMetrics {
                advance_width: 19.25,
                ascent: 8.5,
                descent: 2.0,
                leading: 0.0,
            }
        }
    }

    #[test]
    fn sizes_round_up_to_whole_pixels() {
        let size = label_size(&FractionalMeasurer, "abc", &TextStyle::default());
        assert_eq!(size, Size::new(20.0, 11.0), "both extents round up");
    }

    #[test]
    fn empty_text_is_zero_size() {
        assert_eq!(
            label_size(&HeuristicTextMeasurer, "", &TextStyle::default()),
            Size::ZERO,
            "empty label"
        );
    }

    #[test]
    fn repeated_labels_are_measured_once() {
        let measurer = CountingMeasurer::default();
        let mut cache = LabelCache::new(TextStyle::new(10.0));
        for _ in 0..4 {
            cache.measure(&measurer, "25.0%");
        }
        assert_eq!(measurer.calls.get(), 1, "cache hit after first measure");
        assert_eq!(cache.len(), 1, "one distinct label");
    }

    #[test]
    fn retain_evicts_unwanted_labels() {
        let measurer = CountingMeasurer::default();
        let mut cache = LabelCache::new(TextStyle::new(10.0));
        cache.measure(&measurer, "25.0%");
        cache.measure(&measurer, "75.0%");
        cache.retain(|text| text == "75.0%");
        assert_eq!(cache.len(), 1, "one label evicted");
        cache.measure(&measurer, "75.0%");
        assert_eq!(measurer.calls.get(), 2, "kept label is still a hit");
    }

    #[test]
    fn style_change_invalidates() {
        let measurer = CountingMeasurer::default();
        let mut cache = LabelCache::new(TextStyle::new(10.0));
        let small = cache.measure(&measurer, "label");
        assert!(!cache.set_style(&TextStyle::new(10.0)), "same style keeps entries");
        assert!(cache.set_style(&TextStyle::new(20.0)), "new style clears entries");
        let large = cache.measure(&measurer, "label");
        assert!(large.width > small.width, "re-measured at the new size");
        assert_eq!(measurer.calls.get(), 2, "measured once per style");
    }
}
