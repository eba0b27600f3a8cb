mod fragment;
mod shaped;

use std::ops::Range;

use crate::geometry::Rect;
use crate::text::StyledText;

pub use fragment::FragmentLayout;
pub use shaped::{ShapedLayout, ShapedTextSystem};

pub const DEFAULT_LINE_FRAGMENT_PADDING: f32 = 5.0;
pub const CARET_WIDTH: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("text shaping failed: {0}")]
    Shaping(String),
    #[error("container width {0} is not a usable layout width")]
    InvalidContainer(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextContainer {
    pub width: f32,
    pub line_fragment_padding: f32,
}

impl Default for TextContainer {
    fn default() -> Self {
        Self {
            width: f32::INFINITY,
            line_fragment_padding: DEFAULT_LINE_FRAGMENT_PADDING,
        }
    }
}

impl TextContainer {
    pub fn new(width: f32, line_fragment_padding: f32) -> Self {
        Self {
            width: if width.is_nan() { width } else { width.max(0.0) },
            line_fragment_padding: if line_fragment_padding.is_finite() {
                line_fragment_padding.max(0.0)
            } else {
                0.0
            },
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.width.is_finite()
    }

    pub fn wrap_width(&self) -> Option<f32> {
        self.is_bounded()
            .then(|| (self.width - self.line_fragment_padding * 2.0).max(0.0))
    }

    pub(crate) fn validate(&self) -> Result<(), LayoutError> {
        if self.width.is_nan() {
            return Err(LayoutError::InvalidContainer(self.width));
        }
        Ok(())
    }

    pub(crate) fn fragment_width(&self, used_width: f32) -> f32 {
        if self.is_bounded() {
            self.width
        } else {
            used_width
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineFragment {
    pub rect: Rect,
    pub used_rect: Rect,
    pub range: Range<usize>,
}

impl LineFragment {
    pub fn height(&self) -> f32 {
        self.rect.height
    }
}

/// Rects are in container coordinates: the origin is the top-left corner of
/// the first line fragment, before any insets.
pub trait TextLayoutEngine {
    fn kind(&self) -> LayoutBackendKind;

    fn set_container(&mut self, container: TextContainer);

    fn container(&self) -> TextContainer;

    fn ensure_layout(&mut self, content: &StyledText) -> Result<(), LayoutError>;

    fn reset(&mut self);

    fn used_rect(&self) -> Rect;

    /// Line fragments in layout order. The extra fragment after a trailing
    /// newline is not part of this list.
    fn line_fragments(&self) -> &[LineFragment];

    fn extra_line_fragment(&self) -> Option<Rect>;

    fn caret_rect(&self, byte_index: usize) -> Option<Rect>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutBackendKind {
    Fragment,
    Shaped,
}

#[derive(Clone, Default)]
pub enum LayoutBackend {
    #[default]
    Fragment,
    Shaped(ShapedTextSystem),
}

impl LayoutBackend {
    pub fn detect(window: Option<&gpui::Window>) -> Self {
        match window {
            Some(window) => Self::Shaped(ShapedTextSystem::from_window(window)),
            None => Self::Fragment,
        }
    }

    pub fn kind(&self) -> LayoutBackendKind {
        match self {
            Self::Fragment => LayoutBackendKind::Fragment,
            Self::Shaped(_) => LayoutBackendKind::Shaped,
        }
    }

    pub fn create_engine(&self) -> Box<dyn TextLayoutEngine> {
        match self {
            Self::Fragment => Box::new(FragmentLayout::new()),
            Self::Shaped(system) => Box::new(ShapedLayout::new(system.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_wrap_width_excludes_padding_on_both_sides() {
        assert_eq!(TextContainer::new(100.0, 5.0).wrap_width(), Some(90.0));
        assert_eq!(TextContainer::new(6.0, 5.0).wrap_width(), Some(0.0));
        assert_eq!(TextContainer::new(0.0, 5.0).wrap_width(), Some(0.0));
        assert_eq!(TextContainer::new(-3.0, 0.0).wrap_width(), Some(0.0));
        assert_eq!(TextContainer::new(f32::INFINITY, 5.0).wrap_width(), None);
    }

    #[test]
    fn nan_width_is_rejected() {
        let container = TextContainer::new(f32::NAN, 0.0);
        assert!(matches!(
            container.validate(),
            Err(LayoutError::InvalidContainer(_))
        ));
        assert_eq!(container.line_fragment_padding, 0.0);
    }

    #[test]
    fn headless_detection_uses_fragment_backend() {
        let backend = LayoutBackend::detect(None);
        assert_eq!(backend.kind(), LayoutBackendKind::Fragment);
        assert_eq!(backend.create_engine().kind(), LayoutBackendKind::Fragment);
    }
}
