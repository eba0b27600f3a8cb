use std::rc::Rc;
use std::time::Instant;

use gpui::{
    App, Context, FocusHandle, Focusable, KeyDownEvent, MouseButton, ScrollWheelEvent,
    SharedString, Subscription, Window, canvas, div, prelude::*, px, rgb,
};

use crate::bounds::LineBounds;
use crate::field::{GrowingFieldConfig, GrowingTextField, HeightBinding, HeightRefresh};
use crate::id::ComponentId;
use crate::layout::{LayoutBackend, ShapedTextSystem};
use crate::motion::{HeightTween, MotionConfig};
use crate::text::TypingAttributes;
use crate::transition::HeightChange;

use super::text_input_actions::{
    DeleteBackward, DeleteForward, GROWING_TEXTAREA_KEY_CONTEXT, InsertNewline, MoveDown,
    MoveEnd, MoveHome, MoveLeft, MoveRight, MoveUp, SelectAll, SelectDown, SelectLeft,
    SelectRight, SelectUp, ensure_text_keybindings,
};
use super::text_input_state::InputState;

type ChangeHandler = Rc<dyn Fn(SharedString, &mut Window, &mut App)>;

const BACKGROUND: u32 = 0xffffff;
const BORDER: u32 = 0xd0d4da;
const BORDER_FOCUS: u32 = 0x4c8bf5;
const TEXT: u32 = 0x1f2328;
const PLACEHOLDER: u32 = 0x8c959f;

pub struct GrowingTextarea {
    focus_handle: FocusHandle,
    field: GrowingTextField,
    input: InputState,
    placeholder: Option<SharedString>,
    tween: Option<HeightTween>,
    on_change: Option<ChangeHandler>,
    _subscriptions: Vec<Subscription>,
}

impl GrowingTextarea {
    #[track_caller]
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        ensure_text_keybindings(cx);

        let backend = LayoutBackend::detect(Some(window));
        let mut field = GrowingTextField::new(
            &backend,
            GrowingFieldConfig::default(),
            HeightBinding::Frame,
        );
        field.set_typing_attributes(
            TypingAttributes::new().font(ShapedTextSystem::font_metrics(window)),
        );
        field.set_in_window(true);
        field.set_caret(Some(0));

        let focus_handle = cx.focus_handle();
        let subscriptions = vec![
            cx.on_focus(&focus_handle, window, |this, _window, cx| {
                this.focus_changed(true, cx);
            }),
            cx.on_blur(&focus_handle, window, |this, _window, cx| {
                this.focus_changed(false, cx);
            }),
        ];

        Self {
            focus_handle,
            field,
            input: InputState::default(),
            placeholder: None,
            tween: None,
            on_change: None,
            _subscriptions: subscriptions,
        }
    }

    pub fn id(mut self, id: impl Into<ComponentId>) -> Self {
        self.field = self.field.id(id);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        let placeholder = placeholder.into();
        self.field.set_placeholder(placeholder.to_string());
        self.placeholder = Some(placeholder);
        self
    }

    pub fn value(mut self, value: impl Into<SharedString>) -> Self {
        self.input.reset(value.into().to_string());
        self.field.set_caret(Some(self.input.caret_byte()));
        self.field.set_text(self.input.value.clone());
        self
    }

    pub fn minimum_lines(mut self, lines: usize) -> Self {
        self.field.set_minimum_lines(lines);
        self
    }

    pub fn maximum_lines(mut self, lines: usize) -> Self {
        self.field.set_maximum_lines(lines);
        self
    }

    pub fn animate_height_change(mut self, animate: bool) -> Self {
        self.field.set_animate_height_change(animate);
        self
    }

    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.field.set_motion(motion);
        self
    }

    pub fn on_change(
        mut self,
        handler: impl Fn(SharedString, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    pub fn on_height_change(mut self, handler: impl Fn(&HeightChange) + 'static) -> Self {
        self.field.on_height_change(handler);
        self
    }

    pub fn on_will_change_height(mut self, handler: impl Fn(&HeightChange) + 'static) -> Self {
        self.field.on_will_change_height(handler);
        self
    }

    pub fn on_did_change_height(mut self, handler: impl Fn(&HeightChange) + 'static) -> Self {
        self.field.on_did_change_height(handler);
        self
    }

    pub fn text(&self) -> SharedString {
        self.input.value.clone().into()
    }

    pub fn line_bounds(&self) -> LineBounds {
        self.field.line_bounds()
    }

    pub fn set_text(&mut self, text: impl Into<SharedString>, cx: &mut Context<Self>) {
        self.input.reset(text.into().to_string());
        self.field.set_caret(Some(self.input.caret_byte()));
        let refresh = self.field.set_text(self.input.value.clone());
        self.apply_refresh(refresh, cx);
        cx.notify();
    }

    fn focus_changed(&mut self, focused: bool, cx: &mut Context<Self>) {
        let refresh = self.field.set_focused(focused);
        self.apply_refresh(refresh, cx);
        cx.notify();
    }

    fn width_measured(&mut self, width: f32, cx: &mut Context<Self>) {
        let refresh = self.field.set_width(width);
        self.apply_refresh(refresh, cx);
    }

    fn apply_refresh(&mut self, refresh: HeightRefresh, cx: &mut Context<Self>) {
        match refresh {
            HeightRefresh::Unchanged => {}
            HeightRefresh::Changed(_) => self.tween = None,
            HeightRefresh::Animating(context) => {
                let now = Instant::now();
                let animation = self.field.height_animation();
                let tween = match self.tween {
                    Some(tween) => tween.retarget(context.new_height, animation, now),
                    None => HeightTween::new(
                        context.old_height,
                        context.new_height,
                        animation,
                        now,
                    ),
                };
                self.tween = Some(tween);

                cx.spawn(async move |this, cx| {
                    tween.settled().await;
                    let _ = this.update(cx, |this, cx| {
                        this.field.finish_height_transition(&context);
                        if this
                            .tween
                            .is_some_and(|tween| tween.is_finished(Instant::now()))
                        {
                            this.tween = None;
                        }
                        cx.notify();
                    });
                })
                .detach();
            }
        }
        if self.field.take_layout_request() {
            cx.notify();
        }
    }

    fn selection_changed(&mut self, cx: &mut Context<Self>) {
        self.field.set_selection(Some(self.input.anchored_selection_bytes()));
        self.field.scroll_to_visible_caret_if_needed();
        cx.notify();
    }

    fn edited(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.field.set_selection(Some(self.input.anchored_selection_bytes()));
        let refresh = self.field.text_did_change(self.input.value.clone());
        self.apply_refresh(refresh, cx);
        cx.notify();

        if let Some(handler) = self.on_change.clone() {
            (handler)(self.input.value.clone().into(), window, cx);
        }
    }

    fn move_left(&mut self, _: &MoveLeft, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_left(false);
        self.selection_changed(cx);
    }

    fn move_right(&mut self, _: &MoveRight, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_right(false);
        self.selection_changed(cx);
    }

    fn move_up(&mut self, _: &MoveUp, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_up(false);
        self.selection_changed(cx);
    }

    fn move_down(&mut self, _: &MoveDown, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_down(false);
        self.selection_changed(cx);
    }

    fn move_home(&mut self, _: &MoveHome, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_home(false);
        self.selection_changed(cx);
    }

    fn move_end(&mut self, _: &MoveEnd, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_end(false);
        self.selection_changed(cx);
    }

    fn select_left(&mut self, _: &SelectLeft, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_left(true);
        self.selection_changed(cx);
    }

    fn select_right(&mut self, _: &SelectRight, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_right(true);
        self.selection_changed(cx);
    }

    fn select_up(&mut self, _: &SelectUp, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_up(true);
        self.selection_changed(cx);
    }

    fn select_down(&mut self, _: &SelectDown, _: &mut Window, cx: &mut Context<Self>) {
        self.input.move_down(true);
        self.selection_changed(cx);
    }

    fn select_all(&mut self, _: &SelectAll, _: &mut Window, cx: &mut Context<Self>) {
        self.input.select_all();
        self.selection_changed(cx);
    }

    fn delete_backward(&mut self, _: &DeleteBackward, window: &mut Window, cx: &mut Context<Self>) {
        if self.input.delete_backward() {
            self.edited(window, cx);
        }
    }

    fn delete_forward(&mut self, _: &DeleteForward, window: &mut Window, cx: &mut Context<Self>) {
        if self.input.delete_forward() {
            self.edited(window, cx);
        }
    }

    fn insert_newline(&mut self, _: &InsertNewline, window: &mut Window, cx: &mut Context<Self>) {
        if self.input.insert_text("\n") {
            self.edited(window, cx);
        }
    }

    fn key_down(&mut self, event: &KeyDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        let modifiers = &event.keystroke.modifiers;
        if modifiers.control || modifiers.platform || modifiers.function {
            return;
        }
        let Some(inserted) = event
            .keystroke
            .key_char
            .clone()
            .filter(|value| !value.is_empty() && !value.chars().any(char::is_control))
        else {
            return;
        };
        if self.input.insert_text(&inserted) {
            self.edited(window, cx);
        }
    }

    fn scroll_wheel(&mut self, event: &ScrollWheelEvent, _: &mut Window, cx: &mut Context<Self>) {
        let line_height = self.field.typing_attributes().line_height();
        let delta = f32::from(event.delta.pixel_delta(px(line_height)).y);
        let max_offset = (self.field.content_height() - self.field.current_height()).max(0.0);
        let offset = (self.field.content_offset() - delta).clamp(0.0, max_offset);
        self.field.set_content_offset(offset);
        cx.notify();
    }

    fn render_content(&mut self, focused: bool) -> impl IntoElement {
        let insets = self.field.config().insets();
        let padding = self.field.config().line_fragment_padding;
        let offset = self.field.content_offset();
        let caret = if focused && self.input.selection.is_none() {
            self.field.caret_rect()
        } else {
            None
        };

        let body = if self.input.is_empty() {
            div()
                .text_color(rgb(PLACEHOLDER))
                .child(self.placeholder.clone().unwrap_or_default())
        } else {
            div()
                .text_color(rgb(TEXT))
                .child(SharedString::from(self.input.value.clone()))
        };

        div()
            .absolute()
            .left_0()
            .right_0()
            .top(px(-offset))
            .pt(px(insets.top))
            .pb(px(insets.bottom))
            .pl(px(insets.left + padding))
            .pr(px(insets.right + padding))
            .child(body)
            .children(caret.map(|rect| {
                div()
                    .absolute()
                    .left(px(rect.x))
                    .top(px(rect.y))
                    .w(px(rect.width))
                    .h(px(rect.height))
                    .bg(rgb(BORDER_FOCUS))
            }))
    }
}

impl Render for GrowingTextarea {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let focused = self.focus_handle.is_focused(window);
        let now = Instant::now();
        let height = match self.tween {
            Some(tween) if !tween.is_finished(now) => {
                window.request_animation_frame();
                tween.value_at(now)
            }
            _ => self.field.current_height(),
        };
        let entity = cx.entity();

        div()
            .id(SharedString::from(self.field.component_id().slot("box")))
            .key_context(GROWING_TEXTAREA_KEY_CONTEXT)
            .track_focus(&self.focus_handle)
            .relative()
            .w_full()
            .h(px(height))
            .overflow_hidden()
            .bg(rgb(BACKGROUND))
            .border_1()
            .border_color(rgb(if focused { BORDER_FOCUS } else { BORDER }))
            .rounded(px(6.0))
            .cursor_text()
            .on_action(cx.listener(Self::move_left))
            .on_action(cx.listener(Self::move_right))
            .on_action(cx.listener(Self::move_up))
            .on_action(cx.listener(Self::move_down))
            .on_action(cx.listener(Self::move_home))
            .on_action(cx.listener(Self::move_end))
            .on_action(cx.listener(Self::select_left))
            .on_action(cx.listener(Self::select_right))
            .on_action(cx.listener(Self::select_up))
            .on_action(cx.listener(Self::select_down))
            .on_action(cx.listener(Self::select_all))
            .on_action(cx.listener(Self::delete_backward))
            .on_action(cx.listener(Self::delete_forward))
            .on_action(cx.listener(Self::insert_newline))
            .on_key_down(cx.listener(Self::key_down))
            .on_scroll_wheel(cx.listener(Self::scroll_wheel))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, window, _cx| {
                    window.focus(&this.focus_handle);
                }),
            )
            .child(
                canvas(
                    move |bounds, _window, cx| {
                        let width = f32::from(bounds.size.width);
                        entity.update(cx, |this, cx| this.width_measured(width, cx));
                    },
                    |_, _, _, _| {},
                )
                .absolute()
                .size_full(),
            )
            .child(self.render_content(focused))
    }
}

impl Focusable for GrowingTextarea {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}
