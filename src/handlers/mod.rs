//! Concrete event handler implementations

pub mod recording;
pub mod structured;
pub mod text;

pub use recording::RecordingHandler;
pub use structured::StructuredHandler;
pub use text::{TextHandler, Timezone, DEFAULT_TIME_FORMAT};
