mod bracket;
mod jurisdiction;
mod projection;
mod schedule;
mod tax_result;

pub use bracket::{Bracket, BracketTable, BracketTableError};
pub use jurisdiction::{Jurisdiction, TaxType};
pub use projection::{Growth, ProjectionPoint, SeriesPoint, SeriesSpec};
pub use schedule::{ALLOWANCE, SURCHARGE, ScheduleKey, TaxSchedule};
pub use tax_result::{BracketSlice, TaxResult};
