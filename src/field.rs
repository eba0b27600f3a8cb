use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;
use std::time::Duration;

use crate::bounds::{BoundsPolicy, HeightBounds, LineBounds};
use crate::caret::{ScrollViewport, offset_revealing_caret};
use crate::geometry::{EdgeInsets, Rect, Size};
use crate::id::ComponentId;
use crate::layout::{
    DEFAULT_LINE_FRAGMENT_PADDING, LayoutBackend, LayoutBackendKind, TextContainer,
    TextLayoutEngine,
};
use crate::metrics::{ContentSource, MetricsCalculator};
use crate::motion::{HeightAnimation, MotionConfig};
use crate::text::{StyledText, TypingAttributes};
use crate::transition::{
    HeightChange, HeightChangeHandler, HeightTransitionController, TransitionContext,
    TransitionPhase,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowingFieldConfig {
    pub line_bounds: LineBounds,
    pub animate_height_change: bool,
    pub motion: MotionConfig,
    pub content_insets: EdgeInsets,
    pub container_insets: EdgeInsets,
    pub line_fragment_padding: f32,
}

impl Default for GrowingFieldConfig {
    fn default() -> Self {
        Self {
            line_bounds: LineBounds::default(),
            animate_height_change: true,
            motion: MotionConfig::default(),
            content_insets: EdgeInsets::new(1.0, 0.0, 1.0, 0.0),
            container_insets: EdgeInsets::ZERO,
            line_fragment_padding: DEFAULT_LINE_FRAGMENT_PADDING,
        }
    }
}

impl GrowingFieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum_lines(mut self, lines: usize) -> Self {
        self.line_bounds.set_minimum(lines);
        self
    }

    pub fn maximum_lines(mut self, lines: usize) -> Self {
        self.line_bounds.set_maximum(lines);
        self
    }

    pub fn animate_height_change(mut self, animate: bool) -> Self {
        self.animate_height_change = animate;
        self
    }

    pub fn height_change_animation_duration(mut self, duration: Duration) -> Self {
        self.motion.height.duration = duration;
        self
    }

    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn content_insets(mut self, insets: EdgeInsets) -> Self {
        self.content_insets = insets;
        self
    }

    pub fn container_insets(mut self, insets: EdgeInsets) -> Self {
        self.container_insets = insets;
        self
    }

    pub fn line_fragment_padding(mut self, padding: f32) -> Self {
        self.line_fragment_padding = if padding.is_finite() {
            padding.max(0.0)
        } else {
            0.0
        };
        self
    }

    pub fn insets(&self) -> EdgeInsets {
        self.content_insets + self.container_insets
    }
}

/// Shared handle to a fixed-height constraint owned by the host layout.
#[derive(Clone, Debug, Default)]
pub struct HeightConstraint(Rc<Cell<f32>>);

impl HeightConstraint {
    pub fn new(constant: f32) -> Self {
        Self(Rc::new(Cell::new(constant)))
    }

    pub fn constant(&self) -> f32 {
        self.0.get()
    }

    pub fn set_constant(&self, constant: f32) {
        self.0.set(constant);
    }
}

#[derive(Clone, Debug, Default)]
pub enum HeightBinding {
    Constraint(HeightConstraint),
    Intrinsic,
    #[default]
    Frame,
}

#[derive(Clone, Debug)]
pub struct HeightState {
    pub current_height: f32,
    pub binding: HeightBinding,
    intrinsic_invalidated: bool,
    layout_requested: bool,
}

impl HeightState {
    fn new(binding: HeightBinding) -> Self {
        Self {
            current_height: 0.0,
            binding,
            intrinsic_invalidated: false,
            layout_requested: false,
        }
    }

    pub fn intrinsic_invalidated(&self) -> bool {
        self.intrinsic_invalidated
    }

    pub fn layout_requested(&self) -> bool {
        self.layout_requested
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightRefresh {
    Unchanged,
    Changed(TransitionContext),
    Animating(TransitionContext),
}

impl HeightRefresh {
    pub fn transition(&self) -> Option<&TransitionContext> {
        match self {
            Self::Unchanged => None,
            Self::Changed(context) | Self::Animating(context) => Some(context),
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Animating(_))
    }
}

/// A multi-line text field whose height follows its content between a
/// minimum and maximum number of lines.
pub struct GrowingTextField {
    id: ComponentId,
    config: GrowingFieldConfig,
    text: StyledText,
    placeholder: Option<StyledText>,
    typing: TypingAttributes,
    live: Box<dyn TextLayoutEngine>,
    live_dirty: bool,
    calculator: MetricsCalculator,
    width: Option<f32>,
    height: HeightState,
    controller: HeightTransitionController,
    selection: Option<Range<usize>>,
    pending_edit: Option<Range<usize>>,
    viewport: ScrollViewport,
    focused: bool,
    in_window: bool,
    will_change_height: Option<HeightChangeHandler>,
    did_change_height: Option<HeightChangeHandler>,
    height_change_actions: Option<HeightChangeHandler>,
}

impl GrowingTextField {
    #[track_caller]
    pub fn new(backend: &LayoutBackend, config: GrowingFieldConfig, binding: HeightBinding) -> Self {
        let mut field = Self {
            id: ComponentId::default(),
            config,
            text: StyledText::default(),
            placeholder: None,
            typing: TypingAttributes::default(),
            live: backend.create_engine(),
            live_dirty: true,
            calculator: MetricsCalculator::new(backend.create_engine()),
            width: None,
            height: HeightState::new(binding),
            controller: HeightTransitionController::new(),
            selection: None,
            pending_edit: None,
            viewport: ScrollViewport::default(),
            focused: false,
            in_window: false,
            will_change_height: None,
            did_change_height: None,
            height_change_actions: None,
        };

        let height = field.calculated_height();
        field.height.current_height = height;
        field.viewport.height = height;
        if let HeightBinding::Constraint(constraint) = &field.height.binding {
            constraint.set_constant(height);
            field.height.intrinsic_invalidated = true;
            field.height.layout_requested = true;
        }
        tracing::debug!(
            id = %field.id,
            backend = ?backend.kind(),
            height,
            "growing field created"
        );
        field
    }

    pub fn id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn component_id(&self) -> &ComponentId {
        &self.id
    }

    pub fn config(&self) -> &GrowingFieldConfig {
        &self.config
    }

    pub fn backend_kind(&self) -> LayoutBackendKind {
        self.live.kind()
    }

    pub fn text(&self) -> &StyledText {
        &self.text
    }

    pub fn placeholder(&self) -> Option<&StyledText> {
        self.placeholder.as_ref()
    }

    pub fn typing_attributes(&self) -> &TypingAttributes {
        &self.typing
    }

    pub fn height_state(&self) -> &HeightState {
        &self.height
    }

    pub fn current_height(&self) -> f32 {
        self.height.current_height
    }

    pub fn width(&self) -> f32 {
        self.width.unwrap_or(0.0)
    }

    pub fn phase(&self) -> TransitionPhase {
        self.controller.phase()
    }

    pub fn height_animation(&self) -> HeightAnimation {
        self.config.motion.height
    }

    pub fn line_bounds(&self) -> LineBounds {
        self.config.line_bounds
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn viewport(&self) -> &ScrollViewport {
        &self.viewport
    }

    pub fn content_offset(&self) -> f32 {
        self.viewport.offset_y
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn on_will_change_height(&mut self, handler: impl Fn(&HeightChange) + 'static) {
        self.will_change_height = Some(Rc::new(handler));
    }

    pub fn on_did_change_height(&mut self, handler: impl Fn(&HeightChange) + 'static) {
        self.did_change_height = Some(Rc::new(handler));
    }

    pub fn on_height_change(&mut self, handler: impl Fn(&HeightChange) + 'static) {
        self.height_change_actions = Some(Rc::new(handler));
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> HeightRefresh {
        self.set_attributed_text(StyledText::plain(text, &self.typing))
    }

    pub fn set_attributed_text(&mut self, text: StyledText) -> HeightRefresh {
        self.text = text;
        self.clamp_selection();
        self.live_dirty = true;
        self.refresh_height(false)
    }

    pub fn text_did_change(&mut self, text: impl Into<String>) -> HeightRefresh {
        self.text = self.text.with_text(text, &self.typing);
        self.clamp_selection();
        self.live_dirty = true;
        let animated = self.config.animate_height_change && self.wants_animation();
        self.refresh_height(animated)
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) -> HeightRefresh {
        let placeholder = StyledText::plain(placeholder, &self.typing);
        self.set_attributed_placeholder(Some(placeholder))
    }

    pub fn set_attributed_placeholder(&mut self, placeholder: Option<StyledText>) -> HeightRefresh {
        self.placeholder = placeholder;
        self.refresh_height(false)
    }

    pub fn set_typing_attributes(&mut self, typing: TypingAttributes) -> HeightRefresh {
        self.typing = typing;
        self.refresh_height(false)
    }

    pub fn set_minimum_lines(&mut self, lines: usize) -> HeightRefresh {
        self.config.line_bounds.set_minimum(lines);
        self.refresh_height(false)
    }

    pub fn set_maximum_lines(&mut self, lines: usize) -> HeightRefresh {
        self.config.line_bounds.set_maximum(lines);
        self.refresh_height(false)
    }

    pub fn set_animate_height_change(&mut self, animate: bool) {
        self.config.animate_height_change = animate;
    }

    pub fn set_height_change_animation_duration(&mut self, duration: Duration) {
        self.config.motion.height.duration = duration;
    }

    pub fn set_motion(&mut self, motion: MotionConfig) {
        self.config.motion = motion;
    }

    pub fn set_content_insets(&mut self, insets: EdgeInsets) -> HeightRefresh {
        self.config.content_insets = insets;
        self.live_dirty = true;
        self.refresh_height(false)
    }

    pub fn set_width(&mut self, width: f32) -> HeightRefresh {
        let width = width.is_finite().then(|| width.max(0.0));
        if width == self.width {
            return HeightRefresh::Unchanged;
        }
        tracing::trace!(id = %self.id, from = ?self.width, to = ?width, "field width changed");
        self.width = width;
        self.viewport.width = width.unwrap_or(0.0);
        self.live_dirty = true;
        let animated = self.config.animate_height_change && self.wants_animation();
        self.refresh_height(animated)
    }

    pub fn set_focused(&mut self, focused: bool) -> HeightRefresh {
        if self.focused == focused {
            return HeightRefresh::Unchanged;
        }
        self.focused = focused;
        let animated = self.config.animate_height_change && self.wants_animation();
        self.refresh_height(animated)
    }

    pub fn set_in_window(&mut self, in_window: bool) {
        self.in_window = in_window;
    }

    pub fn set_caret(&mut self, caret: Option<usize>) {
        self.set_selection(caret.map(|caret| caret..caret));
    }

    /// Byte range of the selection from anchor to caret; the end is the
    /// caret even when it precedes the start. Indices past the text resolve
    /// to the end of the text.
    pub fn set_selection(&mut self, selection: Option<Range<usize>>) {
        self.selection = selection;
    }

    pub fn begin_editing(&mut self, range: Range<usize>) {
        self.pending_edit = Some(range);
    }

    pub fn end_editing(&mut self) {
        self.pending_edit = None;
    }

    pub fn set_scroll_gesture(&mut self, dragging: bool, decelerating: bool) {
        self.viewport.dragging = dragging;
        self.viewport.decelerating = decelerating;
    }

    pub fn set_content_offset(&mut self, offset_y: f32) {
        self.viewport.offset_y = offset_y;
    }

    pub fn take_layout_request(&mut self) -> bool {
        let requested = self.height.layout_requested || self.height.intrinsic_invalidated;
        self.height.layout_requested = false;
        self.height.intrinsic_invalidated = false;
        requested
    }

    pub fn calculated_height(&mut self) -> f32 {
        self.measure_clamped(self.text_container_width()).height
    }

    pub fn height_bounds(&mut self) -> HeightBounds {
        let insets = self.config.insets();
        let content = ContentSource::select(&self.text, self.placeholder.as_ref());
        self.calculator.measure(
            content,
            self.text_container_width(),
            self.config.line_fragment_padding,
            insets,
        );
        self.bounds_for_measured(insets)
    }

    pub fn number_of_lines(&mut self) -> usize {
        self.ensure_live_layout();
        self.live.line_fragments().len()
    }

    pub fn size_that_fits(&mut self, proposed: Size) -> Size {
        let width = if proposed.width.is_finite() {
            (proposed.width - self.config.insets().horizontal()).max(0.0)
        } else {
            f32::INFINITY
        };
        self.measure_clamped(width)
    }

    pub fn size_to_fit(&mut self) -> Size {
        let size = self.measure_clamped(f32::INFINITY);
        self.width = Some(size.width);
        self.viewport.width = size.width;
        self.height.current_height = size.height;
        self.viewport.height = size.height;
        self.live_dirty = true;
        size
    }

    pub fn intrinsic_content_size(&mut self) -> Option<f32> {
        match self.height.binding {
            HeightBinding::Constraint(_) => None,
            HeightBinding::Intrinsic | HeightBinding::Frame => Some(self.calculated_height()),
        }
    }

    pub fn refresh_height(&mut self, animated: bool) -> HeightRefresh {
        let old_height = self.height.current_height;
        let new_height = self.calculated_height();
        let animated = animated && self.config.motion.allows_animation();

        let Some(context) = self.controller.begin(
            old_height,
            new_height,
            animated,
            self.config.motion.height.duration,
        ) else {
            self.scroll_to_visible_caret_if_needed();
            return HeightRefresh::Unchanged;
        };

        let change = self.change(&context);
        if let Some(handler) = self.will_change_height.clone() {
            handler(&change);
        }

        self.apply_height(new_height);
        if let Some(actions) = self.height_change_actions.clone() {
            actions(&change);
        }
        self.height.layout_requested = true;

        if animated {
            return HeightRefresh::Animating(context);
        }
        self.complete_transition(&context);
        HeightRefresh::Changed(context)
    }

    /// Completion of an animated transition. Returns `false` when `context`
    /// was already settled.
    pub fn finish_height_transition(&mut self, context: &TransitionContext) -> bool {
        self.complete_transition(context)
    }

    pub fn caret_rect(&mut self) -> Option<Rect> {
        let caret = self.selection.as_ref()?.end;
        self.ensure_live_layout();
        let insets = self.config.insets();
        self.live
            .caret_rect(caret)
            .map(|rect| rect.offset(insets.left, insets.top))
    }

    pub fn content_height(&mut self) -> f32 {
        self.ensure_live_layout();
        (self.live.used_rect().max_y() + self.config.insets().vertical()).ceil()
    }

    pub fn scroll_to_visible_caret_if_needed(&mut self) -> bool {
        if self.selection.is_none()
            || self.pending_edit.is_some()
            || self.viewport.is_tracking_gesture()
        {
            return false;
        }
        let Some(caret_rect) = self.caret_rect() else {
            return false;
        };

        let insets = self.config.insets();
        let visibility = insets
            + EdgeInsets {
                left: self.config.line_fragment_padding,
                ..EdgeInsets::ZERO
            };

        match offset_revealing_caret(&self.viewport, caret_rect, visibility) {
            Some(offset_y) => {
                tracing::trace!(
                    id = %self.id,
                    from = self.viewport.offset_y,
                    to = offset_y,
                    "scrolled caret into view"
                );
                self.viewport.offset_y = offset_y;
                true
            }
            None => false,
        }
    }

    fn complete_transition(&mut self, context: &TransitionContext) -> bool {
        if !self.controller.settle(context) {
            return false;
        }
        self.live_dirty = true;
        self.ensure_live_layout();
        self.scroll_to_visible_caret_if_needed();
        let change = self.change(context);
        if let Some(handler) = self.did_change_height.clone() {
            handler(&change);
        }
        true
    }

    fn apply_height(&mut self, height: f32) {
        self.height.current_height = height;
        self.viewport.height = height;
        match &self.height.binding {
            HeightBinding::Constraint(constraint) => constraint.set_constant(height),
            HeightBinding::Intrinsic => {
                self.height.intrinsic_invalidated = true;
                self.height.layout_requested = true;
            }
            HeightBinding::Frame => {}
        }
    }

    fn change(&self, context: &TransitionContext) -> HeightChange {
        HeightChange {
            field: self.id.clone(),
            from: context.old_height,
            to: context.new_height,
        }
    }

    fn wants_animation(&self) -> bool {
        self.focused && self.in_window
    }

    fn text_container_width(&self) -> f32 {
        match self.width {
            Some(width) => (width - self.config.insets().horizontal()).max(0.0),
            None => f32::INFINITY,
        }
    }

    fn measure_clamped(&mut self, container_width: f32) -> Size {
        let insets = self.config.insets();
        let content = ContentSource::select(&self.text, self.placeholder.as_ref());
        let measured = self.calculator.measure(
            content,
            container_width,
            self.config.line_fragment_padding,
            insets,
        );
        let bounds = self.bounds_for_measured(insets);
        match measured {
            Some(size) => Size::new(size.width, bounds.clamp(size.height)),
            None => Size::new(0.0, bounds.min),
        }
    }

    fn bounds_for_measured(&self, insets: EdgeInsets) -> HeightBounds {
        BoundsPolicy {
            fragments: self.calculator.line_fragments(),
            typing: &self.typing,
            insets,
        }
        .height_bounds(self.config.line_bounds)
    }

    fn ensure_live_layout(&mut self) {
        if !self.live_dirty {
            return;
        }
        self.live_dirty = false;
        self.live.set_container(TextContainer::new(
            self.text_container_width(),
            self.config.line_fragment_padding,
        ));
        if let Err(err) = self.live.ensure_layout(&self.text) {
            tracing::warn!(id = %self.id, %err, "live layout failed");
            self.live.reset();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.text.len();
        if let Some(selection) = self.selection.as_mut() {
            selection.start = selection.start.min(len);
            selection.end = selection.end.min(len);
        }
    }
}
