pub mod recorder;
pub mod record;
pub mod store;

pub use record::{EndReason, MatchRecord};
pub use recorder::MatchRecorder;
pub use store::HistoryStore;
