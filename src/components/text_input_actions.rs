use std::sync::Once;

use gpui::{App, KeyBinding, actions};

pub const GROWING_TEXTAREA_KEY_CONTEXT: &str = "growfield_textarea";

actions!(
    growfield_textarea,
    [
        MoveLeft,
        MoveRight,
        MoveUp,
        MoveDown,
        MoveHome,
        MoveEnd,
        SelectLeft,
        SelectRight,
        SelectUp,
        SelectDown,
        SelectAll,
        DeleteBackward,
        DeleteForward,
        InsertNewline,
    ]
);

static BINDINGS_INIT: Once = Once::new();

pub fn ensure_text_keybindings(cx: &mut App) {
    BINDINGS_INIT.call_once(|| {
        cx.bind_keys(textarea_bindings(GROWING_TEXTAREA_KEY_CONTEXT));
    });
}

fn textarea_bindings(context: &'static str) -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("left", MoveLeft, Some(context)),
        KeyBinding::new("right", MoveRight, Some(context)),
        KeyBinding::new("up", MoveUp, Some(context)),
        KeyBinding::new("down", MoveDown, Some(context)),
        KeyBinding::new("home", MoveHome, Some(context)),
        KeyBinding::new("end", MoveEnd, Some(context)),
        KeyBinding::new("shift-left", SelectLeft, Some(context)),
        KeyBinding::new("shift-right", SelectRight, Some(context)),
        KeyBinding::new("shift-up", SelectUp, Some(context)),
        KeyBinding::new("shift-down", SelectDown, Some(context)),
        KeyBinding::new("cmd-a", SelectAll, Some(context)),
        KeyBinding::new("ctrl-a", SelectAll, Some(context)),
        KeyBinding::new("backspace", DeleteBackward, Some(context)),
        KeyBinding::new("delete", DeleteForward, Some(context)),
        KeyBinding::new("enter", InsertNewline, Some(context)),
    ]
}
