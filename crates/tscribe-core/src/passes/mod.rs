//! Model rewrites, applied by [`crate::pipeline::compile`] in this order:
//! inheritance, dates, enums, tagged unions, revive functions, REST,
//! optional properties, sort.
//!
//! Every pass takes the model by value and returns the rewritten one.

pub mod dates;
pub mod enums;
pub mod inheritance;
pub mod optional_properties;
pub mod path_template;
pub mod rest;
pub mod revive;
pub mod sort;
pub mod tagged_unions;

pub use dates::transform_dates;
pub use enums::transform_enums;
pub use inheritance::{add_implemented_properties, remove_inherited_properties};
pub use optional_properties::declare_optional_properties;
pub use rest::create_rest_declarations;
pub use revive::create_revive_functions;
pub use sort::sort_declarations;
pub use tagged_unions::create_tagged_unions;
