//! Statistical operations over an [`IndicatorTable`](crate::table::IndicatorTable).
//!
//! Every function here is pure: it reads the table and returns a value or a
//! [`StatsError`]. Missing values never take part in a computation.

pub mod cluster;
pub mod correlation;
pub mod error;
pub mod features;
pub mod growth;
pub mod outliers;
pub mod pca;
pub mod ranking;
pub mod summary;
pub mod trend;

pub use cluster::{assign_clusters, ClusterAssignment, ClusterResult, KMeansConfig, LabelScheme};
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use error::{StatsError, StatsResult};
pub use growth::{growth_rate, percent_change};
pub use outliers::{identify_outliers, Outlier, DEFAULT_OUTLIER_THRESHOLD};
pub use pca::{pca_projection, PcaPoint, PcaResult};
pub use ranking::{
    country_averages, group_averages, regional_averages, top_n, Direction, GroupAverage,
};
pub use summary::{gini, inequality_stats, z_scores, InequalityStats};
pub use trend::{trend_analysis, Trend, TrendDirection};
