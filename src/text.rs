pub const SYSTEM_FONT_SIZE: f32 = 14.0;

const DEFAULT_LINE_HEIGHT_RATIO: f32 = 1.2;
const DEFAULT_ADVANCE_RATIO: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub size: f32,
    pub line_height: f32,
    pub advance: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::system()
    }
}

impl FontMetrics {
    pub fn new(size: f32) -> Self {
        let size = if size.is_finite() && size > 0.0 {
            size
        } else {
            SYSTEM_FONT_SIZE
        };
        Self {
            size,
            line_height: size * DEFAULT_LINE_HEIGHT_RATIO,
            advance: size * DEFAULT_ADVANCE_RATIO,
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_FONT_SIZE)
    }

    pub fn line_height(mut self, value: f32) -> Self {
        if value.is_finite() && value > 0.0 {
            self.line_height = value;
        }
        self
    }

    pub fn advance(mut self, value: f32) -> Self {
        if value.is_finite() && value > 0.0 {
            self.advance = value;
        }
        self
    }
}

/// Paragraph-level line metrics. Zero means "not set" for every field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParagraphStyle {
    pub line_height_multiple: f32,
    pub minimum_line_height: f32,
    pub maximum_line_height: f32,
    pub line_spacing: f32,
}

impl ParagraphStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_height_multiple(mut self, value: f32) -> Self {
        self.line_height_multiple = value;
        self
    }

    pub fn minimum_line_height(mut self, value: f32) -> Self {
        self.minimum_line_height = value;
        self
    }

    pub fn maximum_line_height(mut self, value: f32) -> Self {
        self.maximum_line_height = value;
        self
    }

    pub fn line_spacing(mut self, value: f32) -> Self {
        self.line_spacing = value;
        self
    }

    pub fn resolve_line_height(&self, font_line_height: f32) -> f32 {
        let mut line_height = font_line_height;
        if self.line_height_multiple > 0.0 {
            line_height *= self.line_height_multiple;
        }
        if self.minimum_line_height > 0.0 && line_height < self.minimum_line_height {
            line_height = self.minimum_line_height;
        } else if self.maximum_line_height > 0.0 && line_height > self.maximum_line_height {
            line_height = self.maximum_line_height;
        }
        if self.line_spacing.is_finite() {
            line_height += self.line_spacing.max(0.0);
        }
        line_height
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextAttributes {
    pub font: FontMetrics,
    pub paragraph: Option<ParagraphStyle>,
}

impl TextAttributes {
    pub fn new(font: FontMetrics) -> Self {
        Self {
            font,
            paragraph: None,
        }
    }

    pub fn paragraph(mut self, paragraph: ParagraphStyle) -> Self {
        self.paragraph = Some(paragraph);
        self
    }

    pub fn line_height(&self) -> f32 {
        let base = self.font.line_height;
        self.paragraph
            .map(|paragraph| paragraph.resolve_line_height(base))
            .unwrap_or(base)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TypingAttributes {
    pub font: Option<FontMetrics>,
    pub paragraph: Option<ParagraphStyle>,
}

impl TypingAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, font: FontMetrics) -> Self {
        self.font = Some(font);
        self
    }

    pub fn paragraph(mut self, paragraph: ParagraphStyle) -> Self {
        self.paragraph = Some(paragraph);
        self
    }

    pub fn resolved(&self) -> TextAttributes {
        TextAttributes {
            font: self.font.unwrap_or_else(FontMetrics::system),
            paragraph: self.paragraph,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.resolved().line_height()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextRun {
    pub len: usize,
    pub attributes: TextAttributes,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledText {
    text: String,
    runs: Vec<TextRun>,
}

impl StyledText {
    pub fn new(text: impl Into<String>, attributes: TextAttributes) -> Self {
        Self::default().push(text, attributes)
    }

    pub fn plain(text: impl Into<String>, typing: &TypingAttributes) -> Self {
        Self::new(text, typing.resolved())
    }

    pub fn push(mut self, text: impl Into<String>, attributes: TextAttributes) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        match self.runs.last_mut() {
            Some(last) if last.attributes == attributes => last.len += text.len(),
            _ => self.runs.push(TextRun {
                len: text.len(),
                attributes,
            }),
        }
        self.text.push_str(&text);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Attributes at `byte_index`. Past the end this reports the last run so an
    /// empty trailing line keeps the metrics of the text before it.
    pub fn attributes_at(&self, byte_index: usize) -> Option<TextAttributes> {
        let mut end = 0usize;
        for run in &self.runs {
            end += run.len;
            if byte_index < end {
                return Some(run.attributes);
            }
        }
        self.runs.last().map(|run| run.attributes)
    }

    pub fn with_text(&self, text: impl Into<String>, fallback: &TypingAttributes) -> Self {
        let attributes = self
            .runs
            .first()
            .map(|run| run.attributes)
            .unwrap_or_else(|| fallback.resolved());
        Self::new(text, attributes)
    }
}
