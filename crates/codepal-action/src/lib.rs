//! Turning model replies into user-confirmable actions, and running them.

pub mod escape;
pub mod executor;
pub mod parser;

pub use escape::{escape_attr, unescape_attr};
pub use executor::{ActionError, ActionExecutor};
pub use parser::{
    annotate, extract_actions, locate_actions, DirectiveParser, LocatedAction,
    MarkupDirectiveParser, MARKER_PREFIX,
};
