mod growing_textarea;
pub mod text_input_actions;
pub mod text_input_state;

pub use growing_textarea::GrowingTextarea;
