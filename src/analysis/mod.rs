pub mod timing;

pub use timing::{Finding, Severity, TimingAnalyzer, TimingReport};
