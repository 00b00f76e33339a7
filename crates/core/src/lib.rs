pub mod error;
pub mod event;
pub mod sample;
pub mod series;
pub mod state;
pub mod summary;

pub use error::{DashError, Result};
pub use event::Message;
pub use sample::{Channel, ChannelReading, LatestReadings, Sample};
pub use series::{SeriesBuffer, SeriesSnapshot, DEFAULT_CAPACITY};
pub use state::AppState;
pub use summary::environment_summary;
