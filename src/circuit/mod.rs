//! Circuit layout representation and validation.
//!
//! A [`CircuitLayout`] is the declarative netlist a processing unit is built
//! from: node count, the input and output pairs, and every element.

mod layout;
mod types;
mod validate;

pub use layout::CircuitLayout;
pub use types::*;
pub use validate::validate_layout;
