pub mod bus;
pub mod id;
pub mod sink;

pub use bus::UiBus;
pub use id::PanelId;
pub use sink::{RecordingSink, UiSink};
