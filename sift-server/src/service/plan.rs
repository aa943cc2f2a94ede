//! Stage plans
//!
//! Maps each API operation to one of the recognized stage subsets and builds
//! the concrete worker invocations for it.

use sift_core::domain::stage::StageSpec;

use crate::config::Config;

/// The three kinds of worker the pipeline knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Collect,
    Index,
    Query,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Collect => "collect",
            StageKind::Index => "index",
            StageKind::Query => "query",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "collect" => Some(StageKind::Collect),
            "index" => Some(StageKind::Index),
            "query" => Some(StageKind::Query),
            _ => None,
        }
    }

    /// Human-readable summary of what failing this stage means
    pub fn failure_message(&self) -> &'static str {
        match self {
            StageKind::Collect => "Failed to collect reviews",
            StageKind::Index => "Failed to update the review index",
            StageKind::Query => "Failed to answer the question",
        }
    }
}

/// Bounds passed to the collect worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectLimits {
    pub max_pages: u32,
    pub max_reviews: u32,
}

impl CollectLimits {
    pub const fn new(max_pages: u32, max_reviews: u32) -> Self {
        Self {
            max_pages,
            max_reviews,
        }
    }

    /// Applies optional per-request overrides and clamps to `1..=ceiling`
    pub fn resolve(
        self,
        max_pages: Option<u32>,
        max_reviews: Option<u32>,
        pages_ceiling: u32,
        reviews_ceiling: u32,
    ) -> Self {
        Self {
            max_pages: max_pages
                .unwrap_or(self.max_pages)
                .clamp(1, pages_ceiling.max(1)),
            max_reviews: max_reviews
                .unwrap_or(self.max_reviews)
                .clamp(1, reviews_ceiling.max(1)),
        }
    }
}

/// A recognized ordered subset of stages together with its inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePlan {
    CollectOnly {
        product_url: String,
        limits: CollectLimits,
    },
    CollectAndIndex {
        product_url: String,
        limits: CollectLimits,
    },
    QueryOnly {
        question: String,
    },
    Full {
        product_url: String,
        limits: CollectLimits,
        question: String,
    },
}

impl StagePlan {
    pub fn name(&self) -> &'static str {
        match self {
            StagePlan::CollectOnly { .. } => "collect-only",
            StagePlan::CollectAndIndex { .. } => "collect+index",
            StagePlan::QueryOnly { .. } => "query-only",
            StagePlan::Full { .. } => "collect+index+query",
        }
    }

    pub fn stages(&self) -> &'static [StageKind] {
        match self {
            StagePlan::CollectOnly { .. } => &[StageKind::Collect],
            StagePlan::CollectAndIndex { .. } => &[StageKind::Collect, StageKind::Index],
            StagePlan::QueryOnly { .. } => &[StageKind::Query],
            StagePlan::Full { .. } => &[StageKind::Collect, StageKind::Index, StageKind::Query],
        }
    }
}

/// Builds worker invocations from configuration
#[derive(Debug, Clone)]
pub struct StagePlanner {
    config: Config,
}

impl StagePlanner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves request overrides against the given operation defaults
    pub fn limits(
        &self,
        defaults: CollectLimits,
        max_pages: Option<u32>,
        max_reviews: Option<u32>,
    ) -> CollectLimits {
        defaults.resolve(
            max_pages,
            max_reviews,
            self.config.max_pages_ceiling,
            self.config.max_reviews_ceiling,
        )
    }

    /// Stage specs for `plan`, in execution order
    pub fn build(&self, plan: &StagePlan) -> Vec<StageSpec> {
        match plan {
            StagePlan::CollectOnly {
                product_url,
                limits,
            } => vec![self.collect(product_url, *limits)],
            StagePlan::CollectAndIndex {
                product_url,
                limits,
            } => vec![self.collect(product_url, *limits), self.index()],
            StagePlan::QueryOnly { question } => vec![self.query(question)],
            StagePlan::Full {
                product_url,
                limits,
                question,
            } => vec![
                self.collect(product_url, *limits),
                self.index(),
                self.query(question),
            ],
        }
    }

    fn collect(&self, product_url: &str, limits: CollectLimits) -> StageSpec {
        StageSpec::builder(StageKind::Collect.name(), &self.config.worker_program)
            .arg(&self.config.collect_script)
            .arg(format!("--url={}", product_url))
            .arg(format!("--max-pages={}", limits.max_pages))
            .arg(format!("--max-reviews={}", limits.max_reviews))
            .working_dir(&self.config.worker_dir)
            .timeout(self.config.collect_timeout)
            .build()
    }

    fn index(&self) -> StageSpec {
        StageSpec::builder(StageKind::Index.name(), &self.config.worker_program)
            .arg(&self.config.index_script)
            .working_dir(&self.config.worker_dir)
            .timeout(self.config.index_timeout)
            .build()
    }

    fn query(&self, question: &str) -> StageSpec {
        StageSpec::builder(StageKind::Query.name(), &self.config.worker_program)
            .arg(&self.config.query_script)
            .arg(format!("--question={}", question))
            .working_dir(&self.config.worker_dir)
            .timeout(self.config.query_timeout)
            .build()
    }
}
