//! Style cascade: tokenizer, parser, typed values, stylesheet, cascade.

pub mod tokenizer;
pub mod model;
pub mod parser;
pub mod value;
pub mod properties;
pub mod specificity;
pub mod stylesheet;
pub mod cascade;

pub use cascade::{resolve, CascadeEnv, ResolvedStyle};
pub use parser::ParseError;
pub use properties::PropertyError;
pub use stylesheet::Stylesheet;
pub use value::{Colour, Gradient, PropertyValue};
