//! Finance operations over remote flows: stock search, company profiles and
//! comparative analysis.
//!
//! Each operation is a single flow call looked up in the shared
//! [`FlowRegistry`](flowchain_pipeline::FlowRegistry) by a fixed id
//! (`stock_finder`, `company_profiler`, `comparative_analysis`).

pub mod error;
pub mod service;
pub mod types;

pub use error::{FinanceError, Result};
pub use service::{
    COMPANY_PROFILER, COMPARATIVE_ANALYSIS, FinanceService, MAX_COMPARE_SYMBOLS,
    MIN_SEARCH_CHARS, STOCK_FINDER,
};
pub use types::{ChartSpec, CompanyProfile, ComparativeAnalysis, StockSuggestion, group_by_exchange};
