pub mod bounds;
pub mod caret;
pub mod components;
pub mod field;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod metrics;
pub mod motion;
pub mod text;
pub mod transition;

#[cfg(test)]
mod test_growing_field;

pub use bounds::{HeightBounds, LineBounds};
pub use components::GrowingTextarea;
pub use field::{GrowingFieldConfig, GrowingTextField, HeightBinding, HeightConstraint, HeightRefresh};
pub use layout::{LayoutBackend, TextLayoutEngine};
pub use transition::{HeightChange, TransitionContext, TransitionPhase};
