#![forbid(unsafe_code)]

pub mod error;
pub mod history;
pub mod sessions;
pub mod timer_driver;

pub use mastery_core::Clock;

pub use error::{HistoryError, SessionError, TimerDriverError};
pub use history::{DEFAULT_TREND_LEN, DayGroup, HistoryService, HistorySummary, TrendPoint};
pub use sessions::{AggregationSession, DrillSession, PracticeTableSession};
pub use timer_driver::TimerDriver;
