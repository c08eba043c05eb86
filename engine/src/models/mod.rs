// Engine-side request and report models. Plain series types live in `shared::models`.
pub mod report;
pub mod request;

pub use report::{RsiReport, RsiRow};
pub use request::{DateRange, ResolvedRequest, RsiRequest};
