pub mod action;
pub mod message;
pub mod snapshot;
pub mod ui;

pub use action::*;
pub use message::*;
pub use snapshot::*;
pub use ui::*;
