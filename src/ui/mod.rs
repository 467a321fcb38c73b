/// Console output
///
/// - Human-readable sweep report (report.rs)

pub mod report;
