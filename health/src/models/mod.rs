mod entities;
mod grade;
mod report;

pub use entities::{
    CatalogExplore, DashboardRecord, ExploreKey, ExplorePerformance, ExploreQueries, ExploreSize,
    ExploreUnusedFields, FieldUsage, QueryUsage, UsageRecord, UserRecord,
};
pub use grade::{Grade, Rule, first_match};
pub use report::{
    AbandonedDashboards, ExploresWithUnusedFields, InactiveUsers, LargeExplores, OverusedQueries,
    Report, ReportKind, SlowExplores, UnusedExplores, UnusedFields, grade_of,
};
