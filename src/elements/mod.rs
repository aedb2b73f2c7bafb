//! Structural elements module

mod conditions;
mod element;
mod material;
mod node;
mod section;

pub use conditions::{Conditions, Dof, DofCondition};
pub use element::Element;
pub use material::Material;
pub use node::Node;
pub use section::Section;
