mod dashboard;
mod lookml;
mod query;
mod user;

pub use dashboard::Dashboard;
pub use lookml::{ExploreField, ExploreFields, ExploreFieldset, LookmlExplore, LookmlModel};
pub use query::{QueryRequest, Row, RowExt};
pub use user::{User, UserDisplayName};
