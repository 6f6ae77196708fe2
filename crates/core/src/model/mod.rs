mod answers;
mod digits;
mod grid;
mod ids;
mod operation;
mod problem;
mod session;
mod settings;

pub use answers::{AnswerMap, EntryError, parse_entry};
pub use digits::{DigitRange, MAX_DIGITS};
pub use grid::{AggregationGrid, CrossTable, GridCoordinate};
pub use ids::{ParseIdError, SessionResultId};
pub use operation::{Operation, ParseOperationError};
pub use problem::Problem;
pub use session::{SessionKind, SessionResult, SessionResultError};
pub use settings::{PracticeSettings, SettingsError};
