//! Point transforms
//!
//! A transform node maps query points into its child's local space before the
//! child is evaluated.

mod rotate;
mod scale;
mod translate;

pub use rotate::transform_rotate;
pub use scale::transform_scale;
pub use translate::transform_translate;
