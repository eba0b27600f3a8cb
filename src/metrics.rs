use crate::geometry::{EdgeInsets, Size};
use crate::layout::{LineFragment, TextContainer, TextLayoutEngine};
use crate::text::StyledText;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContentSource<'a> {
    Text(&'a StyledText),
    Placeholder(&'a StyledText),
    Empty,
}

impl<'a> ContentSource<'a> {
    pub fn select(text: &'a StyledText, placeholder: Option<&'a StyledText>) -> Self {
        if !text.is_empty() {
            return Self::Text(text);
        }
        match placeholder {
            Some(placeholder) if !placeholder.is_empty() => Self::Placeholder(placeholder),
            _ => Self::Empty,
        }
    }

    pub fn styled(&self) -> Option<&'a StyledText> {
        match self {
            Self::Text(text) | Self::Placeholder(text) => Some(text),
            Self::Empty => None,
        }
    }
}

/// Off-screen measurement with a private engine, reset on every call.
pub struct MetricsCalculator {
    engine: Box<dyn TextLayoutEngine>,
}

impl MetricsCalculator {
    pub fn new(engine: Box<dyn TextLayoutEngine>) -> Self {
        Self { engine }
    }

    /// `None` when there is nothing to measure or the engine failed.
    pub fn measure(
        &mut self,
        content: ContentSource<'_>,
        container_width: f32,
        line_fragment_padding: f32,
        insets: EdgeInsets,
    ) -> Option<Size> {
        self.engine.reset();
        let styled = content.styled()?;

        self.engine
            .set_container(TextContainer::new(container_width, line_fragment_padding));
        if let Err(err) = self.engine.ensure_layout(styled) {
            tracing::warn!(%err, "measurement layout failed");
            self.engine.reset();
            return None;
        }

        let used = self.engine.used_rect();
        let size = Size::new(
            (insets.left + used.max_x() + insets.right).ceil(),
            (insets.top + used.max_y() + insets.bottom).ceil(),
        );
        tracing::trace!(
            width = size.width,
            height = size.height,
            container_width,
            lines = self.engine.line_fragments().len(),
            "measured content"
        );
        Some(size)
    }

    pub fn line_fragments(&self) -> &[LineFragment] {
        self.engine.line_fragments()
    }
}
