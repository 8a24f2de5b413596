pub mod airline;
pub mod criteria;
pub mod flight;
pub mod wire;

pub use airline::{AirlineSource, AirlineSummary, CachedAirline};
pub use criteria::{FilterCriteria, SortKey};
pub use flight::{AirlineRef, FlightStatus, NormalizedFlight};
