mod error;
pub mod model;
mod parser;
pub mod serializer;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use model::{CalendarDocument, Component, Parameter, Property, Value, VEVENT};
pub use parser::parse;
pub use serializer::{render_component, render_document, wrap_single_event, PRODUCT_ID};
