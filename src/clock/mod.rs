pub mod controller;
pub mod dual;
pub mod practice;
pub mod practice_controller;
pub mod state;
pub mod ticker;

pub use controller::{GameController, WallClock};
pub use dual::{DualClock, DualTick, MatchPhase, PlayerNames, Side, TapOutcome};
pub use practice::PracticeClock;
pub use practice_controller::PracticeController;
pub use state::{format_display, Clock, TickOutcome, DEFAULT_INITIAL_SECONDS};
