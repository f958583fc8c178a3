pub mod dashboard;
pub mod ledger;
pub mod sales;

pub use dashboard::{DASHBOARD_MODEL_LIMIT, Dashboard, dashboard};
pub use ledger::{LedgerSummary, balance, entries_in_period, summarize};
pub use sales::{SalesLine, SalesReport, sales_report};
