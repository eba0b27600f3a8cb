use std::sync::Arc;

use gpui::{SharedString, TextStyle, Window, WindowTextSystem, WrappedLine, px};

use crate::geometry::Rect;
use crate::text::{FontMetrics, StyledText};

use super::{
    CARET_WIDTH, LayoutBackendKind, LayoutError, LineFragment, TextContainer, TextLayoutEngine,
};

const ADVANCE_SAMPLE: &str = "0000000000";

#[derive(Clone)]
pub struct ShapedTextSystem {
    text_system: Arc<WindowTextSystem>,
    style: TextStyle,
}

impl ShapedTextSystem {
    pub fn from_window(window: &Window) -> Self {
        Self {
            text_system: window.text_system().clone(),
            style: window.text_style(),
        }
    }

    pub fn font_metrics(window: &Window) -> FontMetrics {
        let rem_size = window.rem_size();
        let style = window.text_style();
        let font_size = style.font_size.to_pixels(rem_size);
        let line_height = style.line_height_in_pixels(rem_size);
        let run = style.to_run(ADVANCE_SAMPLE.len());
        let layout = window
            .text_system()
            .layout_line(ADVANCE_SAMPLE, font_size, &[run], None);
        let advance = f32::from(layout.width) / ADVANCE_SAMPLE.len() as f32;

        FontMetrics::new(f32::from(font_size))
            .line_height(f32::from(line_height))
            .advance(advance)
    }
}

#[derive(Clone, Copy, Debug)]
struct ShapedSegment {
    line: usize,
    line_offset: usize,
    start_x: f32,
}

/// Layout backed by gpui's shaper. Every paragraph is shaped with the font
/// size and paragraph metrics of the content's first run.
pub struct ShapedLayout {
    system: ShapedTextSystem,
    container: TextContainer,
    lines: Vec<WrappedLine>,
    segments: Vec<ShapedSegment>,
    fragments: Vec<LineFragment>,
    extra_fragment: Option<Rect>,
    used: Option<Rect>,
    text_len: usize,
}

impl ShapedLayout {
    pub fn new(system: ShapedTextSystem) -> Self {
        Self {
            system,
            container: TextContainer::default(),
            lines: Vec::new(),
            segments: Vec::new(),
            fragments: Vec::new(),
            extra_fragment: None,
            used: None,
            text_len: 0,
        }
    }

    fn extend_used(&mut self, rect: Rect) {
        self.used = Some(match self.used {
            Some(used) => used.union(&rect),
            None => rect,
        });
    }
}

impl TextLayoutEngine for ShapedLayout {
    fn kind(&self) -> LayoutBackendKind {
        LayoutBackendKind::Shaped
    }

    fn set_container(&mut self, container: TextContainer) {
        self.container = container;
    }

    fn container(&self) -> TextContainer {
        self.container
    }

    fn ensure_layout(&mut self, content: &StyledText) -> Result<(), LayoutError> {
        self.reset();
        self.container.validate()?;
        self.text_len = content.len();

        let attributes = content.attributes_at(0).unwrap_or_default();
        let line_height = attributes.line_height();
        let padding = self.container.line_fragment_padding;
        let mut y = 0.0f32;

        if !content.is_empty() {
            let font_size = px(attributes.font.size);
            let mut style = self.system.style.clone();
            style.font_size = font_size.into();
            let runs = content
                .runs()
                .iter()
                .map(|run| style.to_run(run.len))
                .collect::<Vec<_>>();
            let wrap_width = self.container.wrap_width().map(px);

            let lines = self
                .system
                .text_system
                .shape_text(
                    SharedString::from(content.as_str().to_owned()),
                    font_size,
                    &runs,
                    wrap_width,
                    None,
                )
                .map_err(|err| LayoutError::Shaping(err.to_string()))?;

            let mut offset = 0usize;
            for (line_ix, line) in lines.iter().enumerate() {
                if offset >= self.text_len {
                    break;
                }
                let len = line.len();
                let has_newline = offset + len < self.text_len;
                let layout = &line.unwrapped_layout;

                let mut starts = vec![(0usize, 0.0f32)];
                for boundary in line.wrap_boundaries.iter() {
                    let glyph = &layout.runs[boundary.run_ix].glyphs[boundary.glyph_ix];
                    starts.push((glyph.index, f32::from(glyph.position.x)));
                }
                let line_width = f32::from(layout.width);

                for (segment_ix, &(start, start_x)) in starts.iter().enumerate() {
                    let last_segment = segment_ix + 1 == starts.len();
                    let (end, end_x) = starts
                        .get(segment_ix + 1)
                        .copied()
                        .unwrap_or((len, line_width));
                    let range_end = offset + end + usize::from(last_segment && has_newline);
                    let used_width = (end_x - start_x).max(0.0) + padding * 2.0;
                    let used_rect = Rect::new(0.0, y, used_width, line_height);

                    self.fragments.push(LineFragment {
                        rect: Rect::new(
                            0.0,
                            y,
                            self.container.fragment_width(used_width),
                            line_height,
                        ),
                        used_rect,
                        range: offset + start..range_end,
                    });
                    self.segments.push(ShapedSegment {
                        line: line_ix,
                        line_offset: offset,
                        start_x,
                    });
                    self.extend_used(used_rect);
                    y += line_height;
                }

                offset += len + 1;
            }

            self.lines.extend(lines);
        }

        if content.is_empty() || content.as_str().ends_with('\n') {
            let extra = Rect::new(
                0.0,
                y,
                self.container.fragment_width(padding * 2.0),
                line_height,
            );
            self.extra_fragment = Some(extra);
            self.extend_used(Rect::new(0.0, y, padding * 2.0, line_height));
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.lines.clear();
        self.segments.clear();
        self.fragments.clear();
        self.extra_fragment = None;
        self.used = None;
        self.text_len = 0;
    }

    fn used_rect(&self) -> Rect {
        self.used.unwrap_or(Rect::ZERO)
    }

    fn line_fragments(&self) -> &[LineFragment] {
        &self.fragments
    }

    fn extra_line_fragment(&self) -> Option<Rect> {
        self.extra_fragment
    }

    fn caret_rect(&self, byte_index: usize) -> Option<Rect> {
        let padding = self.container.line_fragment_padding;
        let byte_index = byte_index.min(self.text_len);

        if byte_index == self.text_len
            && let Some(extra) = self.extra_fragment
        {
            return Some(Rect::new(padding, extra.y, CARET_WIDTH, extra.height));
        }

        let fragment_ix = self
            .fragments
            .iter()
            .position(|fragment| fragment.range.contains(&byte_index))
            .or_else(|| self.fragments.len().checked_sub(1))?;
        let fragment = &self.fragments[fragment_ix];
        let segment = self.segments.get(fragment_ix)?;
        let line = self.lines.get(segment.line)?;
        let local = byte_index.saturating_sub(segment.line_offset).min(line.len());
        let x = f32::from(line.unwrapped_layout.x_for_index(local)) - segment.start_x;

        Some(Rect::new(
            padding + x.max(0.0),
            fragment.rect.y,
            CARET_WIDTH,
            fragment.rect.height,
        ))
    }
}
