pub mod reconciler;
pub mod report_parser;
pub mod review;

pub use reconciler::{reconcile, ANCESTOR_SEARCH_LIMIT};
pub use report_parser::{parse_build_info, parse_detailed_report};
pub use review::{ReviewOutcome, ReviewRequest, ReviewService};
