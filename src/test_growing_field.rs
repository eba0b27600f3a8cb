use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::field::{
    GrowingFieldConfig, GrowingTextField, HeightBinding, HeightConstraint, HeightRefresh,
};
use crate::geometry::{EdgeInsets, Size};
use crate::layout::LayoutBackend;
use crate::motion::{MotionConfig, MotionLevel};
use crate::text::{FontMetrics, TypingAttributes};
use crate::transition::TransitionPhase;

const EIGHT_LINES: &str = "1\n2\n3\n4\n5\n6\n7\n8";

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Will(f32, f32),
    Actions(f32, f32),
    Did(f32, f32),
}

fn typing() -> TypingAttributes {
    TypingAttributes::new().font(FontMetrics::new(16.0).line_height(20.0).advance(10.0))
}

fn flat_config() -> GrowingFieldConfig {
    GrowingFieldConfig::new()
        .content_insets(EdgeInsets::ZERO)
        .line_fragment_padding(0.0)
}

fn field_with(config: GrowingFieldConfig, binding: HeightBinding) -> GrowingTextField {
    let mut field = GrowingTextField::new(&LayoutBackend::Fragment, config, binding).id("composer");
    field.set_typing_attributes(typing());
    field.set_width(100.0);
    field
}

fn field() -> GrowingTextField {
    field_with(flat_config(), HeightBinding::Frame)
}

fn record(field: &mut GrowingTextField) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));

    let sink = events.clone();
    field.on_will_change_height(move |change| {
        assert_eq!(change.field.as_str(), "composer");
        sink.borrow_mut().push(Event::Will(change.from, change.to));
    });
    let sink = events.clone();
    field.on_height_change(move |change| {
        sink.borrow_mut().push(Event::Actions(change.from, change.to));
    });
    let sink = events.clone();
    field.on_did_change_height(move |change| {
        sink.borrow_mut().push(Event::Did(change.from, change.to));
    });

    events
}

fn focused_field() -> GrowingTextField {
    let mut field = field();
    field.set_in_window(true);
    field.set_focused(true);
    field
}

#[test]
fn empty_field_is_one_line_tall() {
    let mut field = field();
    assert_eq!(field.current_height(), 20.0);
    let bounds = field.height_bounds();
    assert_eq!((bounds.min, bounds.max), (20.0, 100.0));
    assert_eq!(field.number_of_lines(), 0);
}

#[test]
fn wrapped_lines_sum_their_fragment_heights() {
    let mut field = field();
    field.set_text("abcdefghijabcdefghijabc");
    assert_eq!(field.current_height(), 60.0);
    assert_eq!(field.number_of_lines(), 3);
}

#[test]
fn content_past_the_maximum_plateaus_and_scrolls() {
    let mut field = field();
    field.set_text(EIGHT_LINES);
    assert_eq!(field.current_height(), 100.0);
    assert_eq!(field.height_bounds().max, 100.0);
    assert_eq!(field.number_of_lines(), 8);
    assert!(field.content_height() > field.current_height());
}

#[test]
fn raising_minimum_past_maximum_grows_the_field() {
    let mut field = field();
    let events = record(&mut field);

    let refresh = field.set_minimum_lines(6);
    assert!(matches!(refresh, HeightRefresh::Changed(_)));
    assert_eq!(
        (field.line_bounds().minimum(), field.line_bounds().maximum()),
        (6, 6)
    );
    assert_eq!(field.current_height(), 120.0);
    assert_eq!(
        *events.borrow(),
        vec![
            Event::Will(20.0, 120.0),
            Event::Actions(20.0, 120.0),
            Event::Did(20.0, 120.0)
        ]
    );
}

#[test]
fn lowering_maximum_shrinks_tall_content() {
    let mut field = field();
    field.set_text(EIGHT_LINES);
    field.set_maximum_lines(2);
    assert_eq!(field.current_height(), 40.0);
    assert_eq!(field.line_bounds().minimum(), 1);
}

#[test]
fn animated_growth_defers_did_change_until_completion() {
    let mut field = field();
    field.set_text("a\nb");
    assert_eq!(field.current_height(), 40.0);
    field.set_in_window(true);
    assert_eq!(field.set_focused(true), HeightRefresh::Unchanged);
    let events = record(&mut field);

    let HeightRefresh::Animating(context) = field.text_did_change("a\nb\nc") else {
        panic!("expected an animated transition");
    };
    assert_eq!((context.old_height, context.new_height), (40.0, 60.0));
    assert_eq!(context.duration, Duration::from_millis(350));
    assert_eq!(field.phase(), TransitionPhase::Transitioning);
    assert_eq!(field.current_height(), 60.0);
    assert_eq!(
        *events.borrow(),
        vec![Event::Will(40.0, 60.0), Event::Actions(40.0, 60.0)]
    );

    assert!(field.finish_height_transition(&context));
    assert_eq!(field.phase(), TransitionPhase::Settled);
    assert_eq!(events.borrow().last(), Some(&Event::Did(40.0, 60.0)));

    assert!(!field.finish_height_transition(&context));
    assert_eq!(events.borrow().len(), 3);
}

#[test]
fn overlapping_transitions_each_settle_once() {
    let mut field = focused_field();
    field.set_text("a\nb");
    let events = record(&mut field);

    let HeightRefresh::Animating(first) = field.text_did_change("a\nb\nc") else {
        panic!("expected an animated transition");
    };
    let HeightRefresh::Animating(second) = field.text_did_change("a\nb\nc\nd") else {
        panic!("expected an animated transition");
    };
    assert_eq!((second.old_height, second.new_height), (60.0, 80.0));

    assert!(field.finish_height_transition(&first));
    assert_eq!(field.phase(), TransitionPhase::Transitioning);
    assert!(field.finish_height_transition(&second));
    assert_eq!(field.phase(), TransitionPhase::Settled);

    let dids = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, Event::Did(..)))
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(dids, vec![Event::Did(40.0, 60.0), Event::Did(60.0, 80.0)]);
}

#[test]
fn unfocused_edits_settle_synchronously_in_order() {
    let mut field = field();
    let events = record(&mut field);

    let refresh = field.text_did_change("a\nb");
    assert!(matches!(refresh, HeightRefresh::Changed(_)));
    assert_eq!(
        *events.borrow(),
        vec![
            Event::Will(20.0, 40.0),
            Event::Actions(20.0, 40.0),
            Event::Did(20.0, 40.0)
        ]
    );
}

#[test]
fn motion_settings_can_disable_animation() {
    let mut field = focused_field();
    field.set_motion(MotionConfig::new().level(MotionLevel::Reduced));
    assert!(!field.text_did_change("a\nb").is_animating());

    let mut field = focused_field();
    field.set_animate_height_change(false);
    assert!(!field.text_did_change("a\nb").is_animating());

    let mut field = focused_field();
    field.set_height_change_animation_duration(Duration::ZERO);
    assert!(!field.text_did_change("a\nb").is_animating());
}

#[test]
fn programmatic_text_is_never_animated() {
    let mut field = focused_field();
    assert!(matches!(field.set_text("a\nb"), HeightRefresh::Changed(_)));
}

#[test]
fn recomputing_without_changes_is_silent() {
    let mut field = field();
    field.set_text("a\nb");
    let events = record(&mut field);

    assert_eq!(field.refresh_height(false), HeightRefresh::Unchanged);
    assert_eq!(field.refresh_height(true), HeightRefresh::Unchanged);
    assert_eq!(field.text_did_change("ab\nb"), HeightRefresh::Unchanged);
    assert!(events.borrow().is_empty());
}

#[test]
fn captured_constraint_tracks_the_height() {
    let constraint = HeightConstraint::new(0.0);
    let mut field = field_with(flat_config(), HeightBinding::Constraint(constraint.clone()));
    assert_eq!(constraint.constant(), field.current_height());
    assert_eq!(field.intrinsic_content_size(), None);
    assert!(field.take_layout_request());

    field.set_text("a\nb\nc");
    assert_eq!(constraint.constant(), 60.0);
    assert!(field.take_layout_request());
    assert!(!field.take_layout_request());
}

#[test]
fn intrinsic_binding_invalidates_on_change() {
    let mut field = field_with(flat_config(), HeightBinding::Intrinsic);
    field.take_layout_request();
    assert_eq!(field.intrinsic_content_size(), Some(20.0));

    field.set_text("a\nb");
    assert!(field.height_state().intrinsic_invalidated());
    assert_eq!(field.intrinsic_content_size(), Some(40.0));
    assert!(field.take_layout_request());
    assert!(!field.height_state().intrinsic_invalidated());
}

#[test]
fn trailing_newline_grows_without_counting_a_line() {
    let mut field = field();
    field.set_text("a\n");
    assert_eq!(field.current_height(), 40.0);
    assert_eq!(field.number_of_lines(), 1);
}

#[test]
fn placeholder_is_measured_only_while_text_is_empty() {
    let mut field = field();
    field.set_placeholder("Write a message");
    assert_eq!(field.current_height(), 40.0);

    field.set_text("hi");
    assert_eq!(field.current_height(), 20.0);

    field.set_text("");
    field.set_placeholder("");
    assert_eq!(field.current_height(), 20.0);
}

#[test]
fn default_config_adds_one_point_insets() {
    let config = GrowingFieldConfig::default();
    assert_eq!(config.insets(), EdgeInsets::new(1.0, 0.0, 1.0, 0.0));
    assert_eq!(config.line_fragment_padding, 5.0);
    assert!(config.animate_height_change);
    assert_eq!(config.motion.height.duration, Duration::from_millis(350));

    let mut field = field_with(config, HeightBinding::Frame);
    assert_eq!(field.current_height(), 22.0);
    field.set_text("a\nb");
    assert_eq!(field.current_height(), 42.0);
}

#[test]
fn caret_is_scrolled_into_view_after_growth() {
    let mut field = field();
    field.set_caret(Some(EIGHT_LINES.len()));
    field.set_text(EIGHT_LINES);
    assert_eq!(field.content_offset(), 50.0);
}

#[test]
fn caret_step_waits_for_gestures_and_pending_edits() {
    let mut field = field();
    field.set_text(EIGHT_LINES);
    field.set_caret(Some(EIGHT_LINES.len()));

    field.set_scroll_gesture(true, false);
    field.refresh_height(false);
    assert_eq!(field.content_offset(), 0.0);

    field.set_scroll_gesture(false, false);
    field.begin_editing(0..1);
    field.refresh_height(false);
    assert_eq!(field.content_offset(), 0.0);

    field.end_editing();
    field.refresh_height(false);
    assert_eq!(field.content_offset(), 50.0);
}

#[test]
fn visible_caret_leaves_the_offset_alone() {
    let mut field = field();
    field.set_text(EIGHT_LINES);
    field.set_caret(Some(0));
    assert!(!field.scroll_to_visible_caret_if_needed());
    assert_eq!(field.content_offset(), 0.0);
}

#[test]
fn size_that_fits_measures_against_the_proposed_width() {
    let mut field = field();
    field.set_text("abcdefghij");
    assert_eq!(field.size_that_fits(Size::new(50.0, 0.0)), Size::new(50.0, 40.0));
    assert_eq!(field.current_height(), 20.0);

    let size = field.size_to_fit();
    assert_eq!(size, Size::new(100.0, 20.0));
    assert_eq!(field.width(), 100.0);
}

#[test]
fn width_changes_rewrap_the_content() {
    let mut field = field();
    field.set_text("abcdefghij");
    assert_eq!(field.current_height(), 20.0);
    assert!(matches!(field.set_width(50.0), HeightRefresh::Changed(_)));
    assert_eq!(field.current_height(), 40.0);
    assert_eq!(field.set_width(50.0), HeightRefresh::Unchanged);
}

#[test]
fn narrower_frames_are_never_shorter() {
    let config = flat_config().content_insets(EdgeInsets::new(0.0, 2.0, 0.0, 2.0));
    let mut field = field_with(config, HeightBinding::Frame);
    field.set_text("abcdefghij");

    let heights = [104.0, 54.0, 30.0, 5.0, 3.0, 0.0]
        .into_iter()
        .map(|width| {
            field.set_width(width);
            field.current_height()
        })
        .collect::<Vec<_>>();
    assert_eq!(heights, vec![20.0, 40.0, 100.0, 100.0, 100.0, 100.0]);
}

#[test]
fn unset_width_measures_unbounded() {
    let mut field =
        GrowingTextField::new(&LayoutBackend::Fragment, flat_config(), HeightBinding::Frame);
    field.set_typing_attributes(typing());
    field.set_text("abcdefghijabcdefghij");
    assert_eq!(field.width(), 0.0);
    assert_eq!(field.current_height(), 20.0);
    assert_eq!(field.number_of_lines(), 1);
}
