use crate::geometry::Rect;
use crate::text::{StyledText, TextAttributes};

use super::{
    CARET_WIDTH, LayoutBackendKind, LayoutError, LineFragment, TextContainer, TextLayoutEngine,
};

#[derive(Clone, Copy, Debug)]
struct Glyph {
    index: usize,
    advance: f32,
    line_height: f32,
    whitespace: bool,
    newline: bool,
}

/// Lines break greedily at whitespace; a word wider than the line is split
/// between characters. Trailing whitespace hangs past the wrap width and is
/// not counted in the used width.
#[derive(Default)]
pub struct FragmentLayout {
    container: TextContainer,
    glyphs: Vec<Glyph>,
    fragments: Vec<LineFragment>,
    extra_fragment: Option<Rect>,
    used: Option<Rect>,
    text_len: usize,
}

impl FragmentLayout {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_glyphs(&mut self, content: &StyledText) {
        self.glyphs.clear();
        let mut runs = content.runs().iter();
        let mut current = runs.next();
        let mut run_end = current.map(|run| run.len).unwrap_or(0);

        for (index, ch) in content.as_str().char_indices() {
            while index >= run_end {
                match runs.next() {
                    Some(next) => {
                        current = Some(next);
                        run_end += next.len;
                    }
                    None => break,
                }
            }
            let attributes = current
                .map(|run| run.attributes)
                .unwrap_or_else(TextAttributes::default);
            let newline = ch == '\n';
            let advance = if ch == '\t' {
                attributes.font.advance * 4.0
            } else if newline || ch.is_control() {
                0.0
            } else {
                attributes.font.advance
            };
            self.glyphs.push(Glyph {
                index,
                advance,
                line_height: attributes.line_height(),
                whitespace: ch.is_whitespace() && !newline,
                newline,
            });
        }
    }

    fn byte_at(&self, glyph: usize) -> usize {
        self.glyphs
            .get(glyph)
            .map(|glyph| glyph.index)
            .unwrap_or(self.text_len)
    }

    fn push_line(&mut self, start: usize, end: usize, include_newline: bool, y: &mut f32) {
        let line = &self.glyphs[start..end];
        let trailing_whitespace = line.iter().rev().take_while(|glyph| glyph.whitespace).count();
        let text_width: f32 = line[..line.len() - trailing_whitespace]
            .iter()
            .map(|glyph| glyph.advance)
            .sum();

        let measured = if include_newline {
            &self.glyphs[start..=end]
        } else {
            line
        };
        let height = measured
            .iter()
            .map(|glyph| glyph.line_height)
            .fold(0.0f32, f32::max);

        let padding = self.container.line_fragment_padding;
        let used_width = text_width + padding * 2.0;
        let used_rect = Rect::new(0.0, *y, used_width, height);
        let range_end = if include_newline {
            self.byte_at(end + 1)
        } else {
            self.byte_at(end)
        };
        let range = self.byte_at(start)..range_end;
        let rect = Rect::new(0.0, *y, self.container.fragment_width(used_width), height);

        self.fragments.push(LineFragment {
            rect,
            used_rect,
            range,
        });
        self.extend_used(used_rect);
        *y += height;
    }

    fn layout_paragraph(&mut self, start: usize, end: usize, wrap_width: f32, y: &mut f32) {
        let include_newline = end < self.glyphs.len();
        let mut line_start = start;
        let mut width = 0.0f32;
        let mut last_break: Option<usize> = None;
        let mut index = start;

        while index < end {
            let glyph = self.glyphs[index];
            if glyph.whitespace {
                width += glyph.advance;
                last_break = Some(index + 1);
                index += 1;
                continue;
            }
            if width + glyph.advance > wrap_width && index > line_start {
                let break_at = match last_break {
                    Some(candidate) if candidate > line_start => candidate,
                    _ => index,
                };
                self.push_line(line_start, break_at, false, y);
                line_start = break_at;
                width = self.glyphs[break_at..index]
                    .iter()
                    .map(|glyph| glyph.advance)
                    .sum();
                last_break = None;
                if break_at < index {
                    continue;
                }
            }
            width += glyph.advance;
            index += 1;
        }

        self.push_line(line_start, end, include_newline, y);
    }

    fn extend_used(&mut self, rect: Rect) {
        self.used = Some(match self.used {
            Some(used) => used.union(&rect),
            None => rect,
        });
    }

    fn trailing_line_height(&self, content: &StyledText) -> f32 {
        content
            .attributes_at(content.len())
            .unwrap_or_default()
            .line_height()
    }
}

impl TextLayoutEngine for FragmentLayout {
    fn kind(&self) -> LayoutBackendKind {
        LayoutBackendKind::Fragment
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
        self.collect_glyphs(content);

        let wrap_width = self.container.wrap_width().unwrap_or(f32::INFINITY);
        let mut y = 0.0f32;
        let mut paragraph_start = 0usize;

        loop {
            let paragraph_end = self.glyphs[paragraph_start..]
                .iter()
                .position(|glyph| glyph.newline)
                .map(|offset| paragraph_start + offset);

            let Some(paragraph_end) = paragraph_end else {
                if paragraph_start < self.glyphs.len() {
                    self.layout_paragraph(paragraph_start, self.glyphs.len(), wrap_width, &mut y);
                } else {
                    let padding = self.container.line_fragment_padding;
                    let height = self.trailing_line_height(content);
                    let extra = Rect::new(
                        0.0,
                        y,
                        self.container.fragment_width(padding * 2.0),
                        height,
                    );
                    self.extra_fragment = Some(extra);
                    self.extend_used(Rect::new(0.0, y, padding * 2.0, height));
                }
                break;
            };

            self.layout_paragraph(paragraph_start, paragraph_end, wrap_width, &mut y);
            paragraph_start = paragraph_end + 1;
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.glyphs.clear();
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

        let fragment = self
            .fragments
            .iter()
            .find(|fragment| fragment.range.contains(&byte_index))
            .or_else(|| self.fragments.last())?;

        let x: f32 = self
            .glyphs
            .iter()
            .filter(|glyph| glyph.index >= fragment.range.start && glyph.index < byte_index)
            .map(|glyph| glyph.advance)
            .sum();

        Some(Rect::new(
            padding + x,
            fragment.rect.y,
            CARET_WIDTH,
            fragment.rect.height,
        ))
    }
}
