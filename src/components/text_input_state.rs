use std::ops::Range;

#[derive(Clone, Debug, Default)]
pub struct InputState {
    pub value: String,
    pub caret: usize,
    pub anchor: usize,
    pub selection: Option<(usize, usize)>,
}

impl InputState {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = value.chars().count();
        Self {
            value,
            caret,
            anchor: caret,
            selection: None,
        }
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn caret_byte(&self) -> usize {
        Self::byte_index_at_char(&self.value, self.caret)
    }

    pub fn selection_bytes(&self) -> Range<usize> {
        match self.selection {
            Some((start, end)) => {
                Self::byte_index_at_char(&self.value, start)
                    ..Self::byte_index_at_char(&self.value, end)
            }
            None => self.caret_byte()..self.caret_byte(),
        }
    }

    /// Selection as anchor..caret in bytes. The start is past the end when
    /// the selection was extended leftward.
    pub fn anchored_selection_bytes(&self) -> Range<usize> {
        let caret = self.caret_byte();
        match self.selection {
            Some(_) => Self::byte_index_at_char(&self.value, self.anchor)..caret,
            None => caret..caret,
        }
    }

    pub fn reset(&mut self, value: impl Into<String>) {
        *self = Self::new(value);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.anchor = self.caret;
    }

    pub fn set_caret(&mut self, next_caret: usize, extend: bool) {
        let next_caret = next_caret.min(self.len());
        self.caret = next_caret;
        if extend {
            self.selection = Self::selection_from_anchor(self.anchor, self.caret);
        } else {
            self.clear_selection();
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        if !extend && let Some((start, _)) = self.selection {
            self.set_caret(start, false);
            return;
        }
        self.set_caret(self.caret.saturating_sub(1), extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend && let Some((_, end)) = self.selection {
            self.set_caret(end, false);
            return;
        }
        self.set_caret((self.caret + 1).min(self.len()), extend);
    }

    pub fn move_up(&mut self, extend: bool) {
        let (line, column) = Self::line_col_from_char(&self.value, self.caret);
        let target = if line == 0 {
            0
        } else {
            Self::char_from_line_col(&self.value, line - 1, column)
        };
        self.set_caret(target, extend);
    }

    pub fn move_down(&mut self, extend: bool) {
        let (line, column) = Self::line_col_from_char(&self.value, self.caret);
        let line_count = self.value.chars().filter(|ch| *ch == '\n').count() + 1;
        let target = if line + 1 >= line_count {
            self.len()
        } else {
            Self::char_from_line_col(&self.value, line + 1, column)
        };
        self.set_caret(target, extend);
    }

    pub fn move_home(&mut self, extend: bool) {
        let (line, _) = Self::line_col_from_char(&self.value, self.caret);
        self.set_caret(Self::char_from_line_col(&self.value, line, 0), extend);
    }

    pub fn move_end(&mut self, extend: bool) {
        let (line, _) = Self::line_col_from_char(&self.value, self.caret);
        self.set_caret(
            Self::char_from_line_col(&self.value, line, usize::MAX),
            extend,
        );
    }

    pub fn select_all(&mut self) {
        self.anchor = 0;
        self.set_caret(self.len(), true);
    }

    pub fn delete_backward(&mut self) -> bool {
        if let Some((start, end)) = self.selection {
            self.replace_char_range(start, end, "");
            return true;
        }
        if self.caret == 0 {
            return false;
        }
        self.replace_char_range(self.caret - 1, self.caret, "");
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if let Some((start, end)) = self.selection {
            self.replace_char_range(start, end, "");
            return true;
        }
        if self.caret >= self.len() {
            return false;
        }
        self.replace_char_range(self.caret, self.caret + 1, "");
        true
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let (start, end) = self.selection.unwrap_or((self.caret, self.caret));
        self.replace_char_range(start, end, text);
        true
    }

    pub fn replace_char_range(&mut self, start: usize, end: usize, insert: &str) {
        let len = self.len();
        let start = start.min(len);
        let end = end.min(len).max(start);
        let byte_start = Self::byte_index_at_char(&self.value, start);
        let byte_end = Self::byte_index_at_char(&self.value, end);
        self.value.replace_range(byte_start..byte_end, insert);
        self.caret = (start + insert.chars().count()).min(self.len());
        self.clear_selection();
    }

    pub fn byte_index_at_char(value: &str, char_index: usize) -> usize {
        value
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(value.len())
    }

    fn line_col_from_char(value: &str, char_index: usize) -> (usize, usize) {
        let mut line = 0usize;
        let mut col = 0usize;
        for ch in value.chars().take(char_index) {
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn char_from_line_col(value: &str, line: usize, col: usize) -> usize {
        let mut current_line = 0usize;
        let mut current_col = 0usize;
        for (index, ch) in value.chars().enumerate() {
            if current_line == line && (current_col == col || ch == '\n') {
                return index;
            }
            if ch == '\n' {
                current_line += 1;
                current_col = 0;
            } else if current_line == line {
                current_col += 1;
            }
        }
        value.chars().count()
    }

    fn selection_from_anchor(anchor: usize, caret: usize) -> Option<(usize, usize)> {
        if anchor == caret {
            None
        } else if anchor < caret {
            Some((anchor, caret))
        } else {
            Some((caret, anchor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_handles_selection_and_unicode() {
        let mut state = InputState::new("ab中d");
        assert_eq!(state.len(), 4);
        assert_eq!(state.caret_byte(), "ab中d".len());

        state.set_caret(1, false);
        state.set_caret(3, true);
        assert_eq!(state.selection, Some((1, 3)));
        assert_eq!(state.selection_bytes(), 1.."ab中".len());

        assert!(state.delete_backward());
        assert_eq!(state.value, "ad");
        assert_eq!(state.caret, 1);

        assert!(state.insert_text("XYZ"));
        assert_eq!(state.value, "aXYZd");
        assert_eq!(InputState::byte_index_at_char("a中b", 2), "a中".len());
    }

    #[test]
    fn leftward_selection_keeps_its_anchor() {
        let mut state = InputState::new("héllo");
        state.move_left(true);
        state.move_left(true);
        assert_eq!(state.selection, Some((3, 5)));
        assert_eq!(state.anchored_selection_bytes(), "héllo".len().."hél".len());

        state.move_right(true);
        state.move_right(true);
        state.move_right(true);
        assert_eq!(state.anchored_selection_bytes(), "héllo".len().."héllo".len());

        state.set_caret(1, false);
        assert_eq!(state.anchored_selection_bytes(), 1..1);
    }

    #[test]
    fn vertical_moves_keep_the_column_where_possible() {
        let mut state = InputState::new("hello\nhi\nworld");
        state.move_up(false);
        assert_eq!(state.caret, "hello\nhi".len());
        state.move_up(false);
        assert_eq!(state.caret, 2);
        state.move_up(false);
        assert_eq!(state.caret, 0);
        state.move_down(false);
        assert_eq!(state.caret, "hello\n".len());
        state.move_end(false);
        assert_eq!(state.caret, "hello\nhi".len());
        state.move_home(false);
        assert_eq!(state.caret, "hello\n".len());
    }

    #[test]
    fn select_all_then_delete_clears_the_value() {
        let mut state = InputState::new("one\ntwo");
        state.select_all();
        assert_eq!(state.selection, Some((0, 7)));
        assert!(state.delete_forward());
        assert!(state.is_empty());
        assert!(!state.delete_backward());
    }
}
