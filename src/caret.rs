use crate::geometry::{EdgeInsets, Rect};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollViewport {
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
    pub dragging: bool,
    pub decelerating: bool,
}

impl ScrollViewport {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, self.offset_y, self.width, self.height)
    }

    pub fn is_tracking_gesture(&self) -> bool {
        self.dragging || self.decelerating
    }
}

/// New vertical offset that brings `caret` into view, or `None` when its
/// centre is already visible. `caret` is in view content coordinates.
///
/// Points above the visible area land `2 * top` below the visible top; all
/// others land `2 * bottom` above the visible bottom.
pub fn offset_revealing_caret(
    viewport: &ScrollViewport,
    caret: Rect,
    insets: EdgeInsets,
) -> Option<f32> {
    let point = caret.center_point();
    let visible = viewport.bounds().inset_by(insets);
    if visible.contains(&point) {
        return None;
    }

    let offset = if point.min_y() < visible.min_y() {
        point.min_y() - insets.top * 2.0
    } else {
        point.max_y() + insets.bottom * 2.0 - viewport.height
    };
    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(offset_y: f32) -> ScrollViewport {
        ScrollViewport {
            offset_y,
            width: 200.0,
            height: 60.0,
            ..ScrollViewport::default()
        }
    }

    fn insets() -> EdgeInsets {
        EdgeInsets::new(4.0, 5.0, 4.0, 0.0)
    }

    #[test]
    fn visible_caret_does_not_scroll() {
        let caret = Rect::new(20.0, 24.0, 2.0, 20.0);
        assert_eq!(offset_revealing_caret(&viewport(0.0), caret, insets()), None);
    }

    #[test]
    fn caret_below_the_viewport_sits_above_the_bottom_edge() {
        let caret = Rect::new(20.0, 100.0, 2.0, 20.0);
        assert_eq!(
            offset_revealing_caret(&viewport(0.0), caret, insets()),
            Some(110.0 + 8.0 - 60.0)
        );
    }

    #[test]
    fn caret_above_the_viewport_sits_below_the_top_edge() {
        let caret = Rect::new(20.0, 20.0, 2.0, 20.0);
        assert_eq!(
            offset_revealing_caret(&viewport(80.0), caret, insets()),
            Some(30.0 - 8.0)
        );
    }

    #[test]
    fn caret_left_of_the_padding_scrolls_toward_the_bottom_branch() {
        let caret = Rect::new(0.0, 24.0, 2.0, 20.0);
        assert_eq!(
            offset_revealing_caret(&viewport(0.0), caret, insets()),
            Some(34.0 + 8.0 - 60.0)
        );
    }

    #[test]
    fn gestures_are_reported() {
        let mut viewport = viewport(0.0);
        assert!(!viewport.is_tracking_gesture());
        viewport.decelerating = true;
        assert!(viewport.is_tracking_gesture());
    }
}
