pub mod features;
pub mod lookup;
pub mod report;
pub mod row;
pub mod schema;
pub mod storage;

pub use features::{FeatureRow, TrainingRow};
pub use lookup::LookupTable;
pub use report::RunReport;
pub use row::{NormalizedRow, RawRow};
pub use schema::{registry, ExpectedSchema, LeadingToken, SchemaRegistry};
