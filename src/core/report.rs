//! Report generation business logic.
//!
//! This module builds the exportable reports: CSV text blobs and tabular documents for
//! monthly attendance, attendance per period, student listings, semester grades and
//! class timetables.
//! All functions are pure; saving the results is left to the caller.

use crate::{
    core::{
        aggregate::{Buckets, SubjectSummary},
        document::{Cell, Table, TabularDocument},
        export::to_csv,
        grades::{GradeRollup, sgpa_display},
    },
    models::{AttendanceRecord, ScheduledSession, StudentListing, weekday_name},
};
use chrono::NaiveDate;

/// Placeholder for missing values in document tables.
pub const MISSING: &str = "—";

const HEADING_SIZE: f64 = 14.0;
const BODY_SIZE: f64 = 12.0;

/// English month heading, e.g. `"March 2024"`.
#[must_use]
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Subject summary as CSV with a trailing overall row.
///
/// # Arguments
/// * `summary` - Per-subject tallies
///
/// # Returns
/// CSV text with columns `Subject, Conducted, Attended, Percentage`
#[must_use]
pub fn subject_summary_csv(summary: &SubjectSummary) -> String {
    let mut rows: Vec<Vec<String>> = summary
        .subjects
        .iter()
        .map(|t| {
            vec![
                t.subject.clone(),
                t.conducted.to_string(),
                t.attended.to_string(),
                t.percentage(),
            ]
        })
        .collect();
    rows.push(vec![
        "TOTAL".to_string(),
        summary.total_conducted.to_string(),
        summary.total_attended.to_string(),
        summary.overall_percentage(),
    ]);
    to_csv(&rows, &["Subject", "Conducted", "Attended", "Percentage"])
}

/// Attendance records as CSV, in input order.
#[must_use]
pub fn attendance_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let rows: Vec<Vec<String>> = records
        .into_iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                weekday_name(r.day).to_string(),
                r.subject.clone(),
                r.time_slot.clone().unwrap_or_default(),
                r.status.to_string(),
            ]
        })
        .collect();
    to_csv(&rows, &["Date", "Day", "Subject", "Time", "Status"])
}

/// Monthly attendance document.
///
/// Lays out a `Month Attendance` heading and a rule, a `Subject | Conducted |
/// Attended` table with a `TOTAL` row, and the overall percentage 10 mm below the
/// table.
///
/// # Arguments
/// * `summary` - Per-subject tallies for the month
/// * `month` - Any date inside the reported month
#[must_use]
pub fn monthly_attendance_report(summary: &SubjectSummary, month: NaiveDate) -> TabularDocument {
    let mut table = Table::new(&["Subject", "Conducted", "Attended"]);
    for tally in &summary.subjects {
        table.push_row(vec![
            tally.subject.as_str().into(),
            tally.conducted.into(),
            tally.attended.into(),
        ]);
    }
    let table = table.with_footer(vec![
        "TOTAL".into(),
        summary.total_conducted.into(),
        summary.total_attended.into(),
    ]);

    let mut doc = TabularDocument::new();
    doc.text(
        format!("Month Attendance: {}", month_label(month)),
        HEADING_SIZE,
        24.0,
    )
    .rule(4.0)
    .table(table, 6.0)
    .text(
        format!("Overall Percentage: {}%", summary.overall_percentage()),
        BODY_SIZE,
        10.0,
    );
    doc
}

/// Attendance document with one table per period bucket.
///
/// Each table is captioned with the bucket key and lists `Date | Subject | Status`,
/// followed by a `Total` row with the record count and presence percentage. Tables
/// are stacked, each starting below the previous one.
#[must_use]
pub fn period_report(title: &str, buckets: Buckets<'_>) -> TabularDocument {
    let mut doc = TabularDocument::new();
    doc.text(title, HEADING_SIZE, 8.0);

    for bucket in buckets {
        let mut table = Table::new(&["Date", "Subject", "Status"]).titled(bucket.key.as_str());
        for record in &bucket.records {
            table.push_row(vec![
                record.date.to_string().into(),
                record.subject.as_str().into(),
                record.status.as_str().into(),
            ]);
        }
        let footer = vec![
            "Total".into(),
            bucket.len().into(),
            Cell::Percent(bucket.percentage()),
        ];
        doc.table(table.with_footer(footer), 6.0);
    }
    doc
}

fn listing_fields(student: &StudentListing) -> [Option<String>; 4] {
    [
        student.name.clone(),
        student.branch.clone(),
        student.year.map(|y| y.to_string()),
        student.section.clone(),
    ]
}

/// Student listing as CSV. Missing values are empty fields.
#[must_use]
pub fn roster_csv(students: &[StudentListing]) -> String {
    let rows: Vec<Vec<String>> = students
        .iter()
        .map(|s| {
            listing_fields(s)
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect()
        })
        .collect();
    to_csv(&rows, &["Name", "Branch", "Year", "Section"])
}

/// Student listing document: title, then a numbered `# | Name | Branch | Year |
/// Section` table. Missing values print as a dash.
#[must_use]
pub fn roster_report(title: &str, students: &[StudentListing]) -> TabularDocument {
    let mut table = Table::new(&["#", "Name", "Branch", "Year", "Section"]);
    for (index, student) in students.iter().enumerate() {
        let mut row: Vec<Cell> = vec![(index + 1).into()];
        row.extend(listing_fields(student).into_iter().map(|field| {
            field
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| MISSING.to_string())
                .into()
        }));
        table.push_row(row);
    }

    let mut doc = TabularDocument::new();
    doc.text(title, 16.0, 8.0).table(table, 8.0);
    doc
}

/// Semester grades document: the CGPA, a `Semester | SGPA` overview in ascending
/// semester order, then one `Subject | Grade | Credits` table per semester.
#[must_use]
pub fn semester_grades_report(rollup: &GradeRollup<'_>) -> TabularDocument {
    let mut overview = Table::new(&["Semester", "SGPA"]);
    for semester in rollup.semesters() {
        overview.push_row(vec![
            semester.number.to_string().into(),
            sgpa_display(semester).into(),
        ]);
    }

    let mut doc = TabularDocument::new();
    doc.text(format!("CGPA: {}", rollup.cgpa()), HEADING_SIZE, 8.0)
        .table(overview, 6.0);

    for semester in rollup.semesters() {
        let mut table = Table::new(&["Subject", "Grade", "Credits"])
            .titled(format!("Semester {}", semester.number));
        let mut credits = 0;
        for subject in &semester.subjects {
            credits += subject.credits;
            table.push_row(vec![
                subject.name.as_str().into(),
                subject.grade.as_str().into(),
                subject.credits.to_string().into(),
            ]);
        }
        let footer = vec!["Total credits".into(), "".into(), credits.to_string().into()];
        doc.table(table.with_footer(footer), 8.0);
    }
    doc
}

/// Teaching days shown in a timetable grid.
pub const TIMETABLE_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Rows of a timetable grid, in teaching order.
pub const TIMETABLE_SLOTS: [&str; 6] = [
    "10:00 AM - 11:00 AM",
    "11:00 AM - 12:00 PM",
    "12:00 PM - 1:00 PM",
    "1:00 PM - 2:00 PM",
    "2:00 PM - 3:00 PM",
    "3:00 PM - 4:00 PM",
];

/// Subject name the timetable uses for the lunch slot.
pub const LUNCH_BREAK: &str = "LUNCH BREAK";

const EMPTY_SLOT: &str = "-";

/// Finds the session of one class group held on `day` in slot `time`.
fn timetable_cell<'a>(
    slots: &'a [ScheduledSession],
    year: u32,
    section: &str,
    day: &str,
    time: &str,
) -> Option<&'a ScheduledSession> {
    slots.iter().find(|s| {
        s.session.year == year
            && s.session.section.eq_ignore_ascii_case(section)
            && s.day.eq_ignore_ascii_case(day)
            && s.session.time_slot == time
    })
}

/// `Time × Monday..Friday` grid of one class group; `cell` formats a taught slot.
/// Free slots and the lunch break print as `-`.
fn timetable_grid(
    slots: &[ScheduledSession],
    year: u32,
    section: &str,
    cell: impl Fn(&ScheduledSession) -> String,
) -> Vec<Vec<String>> {
    TIMETABLE_SLOTS
        .iter()
        .map(|time| {
            let mut row = vec![(*time).to_string()];
            row.extend(TIMETABLE_DAYS.iter().map(|day| {
                timetable_cell(slots, year, section, day, time)
                    .filter(|s| {
                        let subject = s.session.subject.trim();
                        !subject.is_empty() && subject != LUNCH_BREAK
                    })
                    .map_or_else(|| EMPTY_SLOT.to_string(), &cell)
            }));
            row
        })
        .collect()
}

fn timetable_header() -> Vec<&'static str> {
    let mut header = vec!["Time"];
    header.extend(TIMETABLE_DAYS);
    header
}

/// Weekly timetable of one class group as CSV.
///
/// Taught slots read `Subject (Teacher)`, with `-` for an unknown teacher.
#[must_use]
pub fn timetable_csv(slots: &[ScheduledSession], year: u32, section: &str) -> String {
    let rows = timetable_grid(slots, year, section, |s| {
        format!(
            "{} ({})",
            s.session.subject,
            s.teacher.as_deref().unwrap_or(EMPTY_SLOT)
        )
    });
    to_csv(&rows, &timetable_header())
}

/// Weekly timetable document of one class group, titled
/// `<branch> - Year <year>, Section <section>`. Meant for a landscape page.
#[must_use]
pub fn timetable_report(
    slots: &[ScheduledSession],
    branch: &str,
    year: u32,
    section: &str,
) -> TabularDocument {
    let rows = timetable_grid(slots, year, section, |s| match &s.teacher {
        Some(teacher) => format!("{} / {}", s.session.subject, teacher),
        None => s.session.subject.clone(),
    });
    let mut table = Table::new(&timetable_header());
    for row in rows {
        table.push_row(row.into_iter().map(Cell::from).collect());
    }

    let mut doc = TabularDocument::new();
    doc.text(
        format!("{branch} - Year {year}, Section {section}"),
        16.0,
        18.0,
    )
    .table(table, 8.0);
    doc
}
