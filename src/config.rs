/// Default number of 404 responses that marks an IP as suspicious
pub const DEFAULT_THRESH_404: usize = 50;
/// Default number of 5xx responses that marks an IP as suspicious
pub const DEFAULT_THRESH_5XX: usize = 10;
/// Default length of the top-IP and top-path lists in the report
pub const DEFAULT_TOP_N: usize = 20;

/// Knobs consumed by the report builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub thresh_404: usize,
    pub thresh_5xx: usize,
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresh_404: DEFAULT_THRESH_404,
            thresh_5xx: DEFAULT_THRESH_5XX,
            top_n: DEFAULT_TOP_N,
        }
    }
}
