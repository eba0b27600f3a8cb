use crate::geometry::EdgeInsets;
use crate::layout::LineFragment;
use crate::text::TypingAttributes;

pub const DEFAULT_MINIMUM_LINES: usize = 1;
pub const DEFAULT_MAXIMUM_LINES: usize = 5;

/// Visible line range of the field. Always `1 <= minimum <= maximum`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineBounds {
    minimum: usize,
    maximum: usize,
}

impl Default for LineBounds {
    fn default() -> Self {
        Self {
            minimum: DEFAULT_MINIMUM_LINES,
            maximum: DEFAULT_MAXIMUM_LINES,
        }
    }
}

impl LineBounds {
    pub fn new(minimum: usize, maximum: usize) -> Self {
        let mut bounds = Self::default();
        bounds.set_minimum(minimum);
        bounds.set_maximum(maximum.max(bounds.minimum));
        bounds
    }

    pub fn minimum(&self) -> usize {
        self.minimum
    }

    pub fn maximum(&self) -> usize {
        self.maximum
    }

    pub fn set_minimum(&mut self, lines: usize) -> bool {
        let previous = *self;
        self.minimum = lines.max(1);
        if self.minimum > self.maximum {
            tracing::debug!(
                minimum = self.minimum,
                maximum = self.maximum,
                "raising maximum lines to the new minimum"
            );
            self.maximum = self.minimum;
        }
        *self != previous
    }

    pub fn set_maximum(&mut self, lines: usize) -> bool {
        let previous = *self;
        self.maximum = lines.max(1);
        if self.maximum < self.minimum {
            tracing::debug!(
                minimum = self.minimum,
                maximum = self.maximum,
                "lowering minimum lines to the new maximum"
            );
            self.minimum = self.maximum;
        }
        *self != previous
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightBounds {
    pub min: f32,
    pub max: f32,
}

impl HeightBounds {
    pub fn clamp(&self, height: f32) -> f32 {
        height.min(self.max).max(self.min)
    }
}

pub struct BoundsPolicy<'a> {
    pub fragments: &'a [LineFragment],
    pub typing: &'a TypingAttributes,
    pub insets: EdgeInsets,
}

impl BoundsPolicy<'_> {
    pub fn height_for_line_count(&self, lines: usize) -> f32 {
        let mut height = self.insets.vertical();

        let measured = self.fragments.iter().take(lines);
        let measured_lines = measured.len();
        height += measured.map(LineFragment::height).sum::<f32>();

        let remaining = lines - measured_lines;
        if remaining > 0 {
            height += self.typing.line_height() * remaining as f32;
        }

        height.ceil()
    }

    pub fn height_bounds(&self, bounds: LineBounds) -> HeightBounds {
        HeightBounds {
            min: self.height_for_line_count(bounds.minimum()),
            max: self.height_for_line_count(bounds.maximum()),
        }
    }
}
