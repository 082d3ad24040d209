use super::entities::{
    DashboardRecord, ExplorePerformance, ExploreQueries, ExploreSize, ExploreUnusedFields,
    FieldUsage, QueryUsage,
};
use super::grade::{Grade, Rule, first_match};
use common::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The closed set of health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    InactiveUsers,
    SlowExplores,
    LargeExplores,
    UnusedExplores,
    UnusedFields,
    ExploresWithUnusedFields,
    AbandonedDashboards,
    OverusedQueries,
}

impl ReportKind {
    pub const ALL: [ReportKind; 8] = [
        ReportKind::InactiveUsers,
        ReportKind::SlowExplores,
        ReportKind::LargeExplores,
        ReportKind::UnusedExplores,
        ReportKind::UnusedFields,
        ReportKind::ExploresWithUnusedFields,
        ReportKind::AbandonedDashboards,
        ReportKind::OverusedQueries,
    ];

    pub fn test_id(&self) -> &'static str {
        match self {
            ReportKind::InactiveUsers => "inactive_users",
            ReportKind::SlowExplores => "slow_explores",
            ReportKind::LargeExplores => "large_explores",
            ReportKind::UnusedExplores => "unused_explores",
            ReportKind::UnusedFields => "unused_fields",
            ReportKind::ExploresWithUnusedFields => "explores_with_unused_fields",
            ReportKind::AbandonedDashboards => "abandoned_dashboards",
            ReportKind::OverusedQueries => "overused_queries",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReportKind::InactiveUsers => "Inactive Users",
            ReportKind::SlowExplores => "Slow Explores",
            ReportKind::LargeExplores => "Large Explores",
            ReportKind::UnusedExplores => "Unused Explores",
            ReportKind::UnusedFields => "Unused Fields",
            ReportKind::ExploresWithUnusedFields => "Explores with Unused Fields",
            ReportKind::AbandonedDashboards => "Abandoned Dashboards",
            ReportKind::OverusedQueries => "Overused Queries",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.test_id())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.test_id() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown report '{}'", s)))
    }
}

fn ratio(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::DegenerateInput(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )))
    }
}

fn non_empty<T>(name: &str, items: Vec<T>) -> Result<Vec<T>> {
    if items.is_empty() {
        Err(Error::DegenerateInput(format!("{} is empty", name)))
    } else {
        Ok(items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InactiveUsers {
    pct_inactive: f64,
    sample_user_names: Vec<String>,
}

const INACTIVE_USERS: &[Rule<InactiveUsers>] = &[
    Rule {
        grade: Grade::Bad,
        applies: |r| r.pct_inactive > 0.3,
    },
    Rule {
        grade: Grade::Ok,
        applies: |r| r.pct_inactive > 0.1,
    },
];

impl InactiveUsers {
    pub fn new(pct_inactive: f64, sample_user_names: Vec<String>) -> Result<Self> {
        Ok(Self {
            pct_inactive: ratio("pct_inactive", pct_inactive)?,
            sample_user_names,
        })
    }

    pub fn pct_inactive(&self) -> f64 {
        self.pct_inactive
    }

    pub fn sample_user_names(&self) -> &[String] {
        &self.sample_user_names
    }

    pub fn grade(&self) -> Grade {
        first_match(self, INACTIVE_USERS, Grade::Good)
    }
}

/// Slowest explores, sorted by average runtime descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowExplores {
    slow_explores: Vec<ExplorePerformance>,
}

const SLOW_EXPLORES: &[Rule<SlowExplores>] = &[
    Rule {
        grade: Grade::Bad,
        applies: |r| r.slowest().avg_runtime > 40.0,
    },
    Rule {
        grade: Grade::Ok,
        applies: |r| r.slowest().avg_runtime > 20.0,
    },
];

impl SlowExplores {
    pub fn new(slow_explores: Vec<ExplorePerformance>) -> Result<Self> {
        Ok(Self {
            slow_explores: non_empty("slow_explores", slow_explores)?,
        })
    }

    pub fn slow_explores(&self) -> &[ExplorePerformance] {
        &self.slow_explores
    }

    fn slowest(&self) -> &ExplorePerformance {
        &self.slow_explores[0]
    }

    pub fn grade(&self) -> Grade {
        first_match(self, SLOW_EXPLORES, Grade::Good)
    }
}

/// Largest explores by field count, plus the catalog-wide median size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargeExplores {
    large_explores: Vec<ExploreSize>,
    median_explore_size: f64,
}

const LARGE_EXPLORES: &[Rule<LargeExplores>] = &[
    Rule {
        grade: Grade::Bad,
        applies: |r| r.large_explores[0].field_count >= 750,
    },
    Rule {
        grade: Grade::Ok,
        applies: |r| r.large_explores[0].field_count >= 300,
    },
];

impl LargeExplores {
    pub fn new(large_explores: Vec<ExploreSize>, median_explore_size: f64) -> Result<Self> {
        if !median_explore_size.is_finite() || median_explore_size < 0.0 {
            return Err(Error::DegenerateInput(format!(
                "median_explore_size must be a non-negative number, got {}",
                median_explore_size
            )));
        }
        Ok(Self {
            large_explores: non_empty("large_explores", large_explores)?,
            median_explore_size,
        })
    }

    pub fn large_explores(&self) -> &[ExploreSize] {
        &self.large_explores
    }

    pub fn median_explore_size(&self) -> f64 {
        self.median_explore_size
    }

    pub fn grade(&self) -> Grade {
        first_match(self, LARGE_EXPLORES, Grade::Good)
    }
}

/// Least-used explores (ascending by query count) and how many fall under the bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedExplores {
    unused_explores: Vec<ExploreQueries>,
    unused_count: usize,
    unused_percentage: f64,
}

const UNUSED_EXPLORES: &[Rule<UnusedExplores>] = &[
    Rule {
        grade: Grade::Bad,
        applies: |r| r.unused_count > 5 || r.unused_percentage > 0.05,
    },
    Rule {
        grade: Grade::Ok,
        applies: |r| r.unused_count > 2 || r.unused_percentage > 0.02,
    },
];

impl UnusedExplores {
    pub fn new(
        unused_explores: Vec<ExploreQueries>,
        unused_count: usize,
        unused_percentage: f64,
    ) -> Result<Self> {
        if unused_explores.len() > unused_count {
            return Err(Error::DegenerateInput(format!(
                "{} sampled explores exceed the unused count of {}",
                unused_explores.len(),
                unused_count
            )));
        }
        Ok(Self {
            unused_explores,
            unused_count,
            unused_percentage: ratio("unused_percentage", unused_percentage)?,
        })
    }

    pub fn unused_explores(&self) -> &[ExploreQueries] {
        &self.unused_explores
    }

    pub fn unused_count(&self) -> usize {
        self.unused_count
    }

    pub fn unused_percentage(&self) -> f64 {
        self.unused_percentage
    }

    pub fn grade(&self) -> Grade {
        first_match(self, UNUSED_EXPLORES, Grade::Good)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedFields {
    pct_unused: f64,
    sample_unused_fields: Vec<FieldUsage>,
}

impl UnusedFields {
    pub fn new(pct_unused: f64, sample_unused_fields: Vec<FieldUsage>) -> Result<Self> {
        Ok(Self {
            pct_unused: ratio("pct_unused", pct_unused)?,
            sample_unused_fields,
        })
    }

    pub fn pct_unused(&self) -> f64 {
        self.pct_unused
    }

    pub fn sample_unused_fields(&self) -> &[FieldUsage] {
        &self.sample_unused_fields
    }

    // No thresholds have been agreed for field usage yet.
    pub fn grade(&self) -> Grade {
        Grade::Bad
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploresWithUnusedFields {
    explores: Vec<ExploreUnusedFields>,
}

impl ExploresWithUnusedFields {
    pub fn new(explores: Vec<ExploreUnusedFields>) -> Result<Self> {
        for explore in &explores {
            ratio("pct_unused", explore.pct_unused)?;
        }
        Ok(Self { explores })
    }

    pub fn explores(&self) -> &[ExploreUnusedFields] {
        &self.explores
    }

    pub fn grade(&self) -> Grade {
        Grade::Bad
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbandonedDashboards {
    pct_abandoned: f64,
    count_abandoned: usize,
    sample_abandoned_dashboards: Vec<DashboardRecord>,
}

const ABANDONED_DASHBOARDS: &[Rule<AbandonedDashboards>] = &[
    Rule {
        grade: Grade::Bad,
        applies: |r| r.pct_abandoned > 0.1,
    },
    Rule {
        grade: Grade::Ok,
        applies: |r| r.pct_abandoned > 0.05,
    },
];

impl AbandonedDashboards {
    pub fn new(
        pct_abandoned: f64,
        count_abandoned: usize,
        sample_abandoned_dashboards: Vec<DashboardRecord>,
    ) -> Result<Self> {
        Ok(Self {
            pct_abandoned: ratio("pct_abandoned", pct_abandoned)?,
            count_abandoned,
            sample_abandoned_dashboards,
        })
    }

    pub fn pct_abandoned(&self) -> f64 {
        self.pct_abandoned
    }

    pub fn count_abandoned(&self) -> usize {
        self.count_abandoned
    }

    pub fn sample_abandoned_dashboards(&self) -> &[DashboardRecord] {
        &self.sample_abandoned_dashboards
    }

    pub fn grade(&self) -> Grade {
        first_match(self, ABANDONED_DASHBOARDS, Grade::Good)
    }
}

/// Most re-run queries, sorted by database run count descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverusedQueries {
    sample_overused_queries: Vec<QueryUsage>,
}

// 3360 = 20 runs an hour for a week.
const OVERUSED_QUERIES: &[Rule<OverusedQueries>] = &[
    Rule {
        grade: Grade::Bad,
        applies: |r| r.sample_overused_queries[0].database_run_count > 3360,
    },
    Rule {
        grade: Grade::Ok,
        applies: |r| r.sample_overused_queries[0].database_run_count > 1680,
    },
];

impl OverusedQueries {
    pub fn new(sample_overused_queries: Vec<QueryUsage>) -> Result<Self> {
        Ok(Self {
            sample_overused_queries: non_empty("sample_overused_queries", sample_overused_queries)?,
        })
    }

    pub fn sample_overused_queries(&self) -> &[QueryUsage] {
        &self.sample_overused_queries
    }

    pub fn grade(&self) -> Grade {
        first_match(self, OVERUSED_QUERIES, Grade::Good)
    }
}

/// Outcome of one health check.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    InactiveUsers(InactiveUsers),
    SlowExplores(SlowExplores),
    LargeExplores(LargeExplores),
    UnusedExplores(UnusedExplores),
    UnusedFields(UnusedFields),
    ExploresWithUnusedFields(ExploresWithUnusedFields),
    AbandonedDashboards(AbandonedDashboards),
    OverusedQueries(OverusedQueries),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::InactiveUsers(_) => ReportKind::InactiveUsers,
            Report::SlowExplores(_) => ReportKind::SlowExplores,
            Report::LargeExplores(_) => ReportKind::LargeExplores,
            Report::UnusedExplores(_) => ReportKind::UnusedExplores,
            Report::UnusedFields(_) => ReportKind::UnusedFields,
            Report::ExploresWithUnusedFields(_) => ReportKind::ExploresWithUnusedFields,
            Report::AbandonedDashboards(_) => ReportKind::AbandonedDashboards,
            Report::OverusedQueries(_) => ReportKind::OverusedQueries,
        }
    }

    pub fn grade(&self) -> Grade {
        grade_of(self)
    }
}

/// Derives the grade from the report payload; nothing about it is stored.
pub fn grade_of(report: &Report) -> Grade {
    match report {
        Report::InactiveUsers(r) => r.grade(),
        Report::SlowExplores(r) => r.grade(),
        Report::LargeExplores(r) => r.grade(),
        Report::UnusedExplores(r) => r.grade(),
        Report::UnusedFields(r) => r.grade(),
        Report::ExploresWithUnusedFields(r) => r.grade(),
        Report::AbandonedDashboards(r) => r.grade(),
        Report::OverusedQueries(r) => r.grade(),
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    name: &'static str,
    test_id: &'static str,
    #[serde(flatten)]
    payload: &'a T,
    grade: Grade,
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        fn envelope<'a, T: Serialize>(report: &Report, payload: &'a T) -> Envelope<'a, T> {
            let kind = report.kind();
            Envelope {
                name: kind.display_name(),
                test_id: kind.test_id(),
                payload,
                grade: grade_of(report),
            }
        }

        match self {
            Report::InactiveUsers(r) => envelope(self, r).serialize(serializer),
            Report::SlowExplores(r) => envelope(self, r).serialize(serializer),
            Report::LargeExplores(r) => envelope(self, r).serialize(serializer),
            Report::UnusedExplores(r) => envelope(self, r).serialize(serializer),
            Report::UnusedFields(r) => envelope(self, r).serialize(serializer),
            Report::ExploresWithUnusedFields(r) => envelope(self, r).serialize(serializer),
            Report::AbandonedDashboards(r) => envelope(self, r).serialize(serializer),
            Report::OverusedQueries(r) => envelope(self, r).serialize(serializer),
        }
    }
}
