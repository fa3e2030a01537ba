/// Period bucketing, presence percentages and subject tallies
pub mod aggregate;

/// Bulk attendance capture workflow
pub mod capture;

/// Paginated tabular documents
pub mod document;

/// CSV export and report file naming
pub mod export;

/// Semester and CGPA rollups
pub mod grades;

/// Leave approval chain
pub mod leave;

/// Report builders for attendance, rosters and grades
pub mod report;
