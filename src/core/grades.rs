//! Grade rollup business logic.
//!
//! Presents a student's published SGPA/CGPA values: semesters sorted by number, a
//! default semester selection for detail views, and the authoritative CGPA or a
//! placeholder when none was published.

use crate::{
    errors::{Error, Result},
    models::{GradeRecord, Semester},
};
use std::collections::HashSet;

/// Placeholder shown when no CGPA has been published.
pub const UNAVAILABLE: &str = "N/A";

/// Formats a grade point the way the API publishes it (`8.4`, `9`).
#[must_use]
pub fn format_grade_point(value: f64) -> String {
    value.to_string()
}

/// The student's CGPA for display, or [`UNAVAILABLE`].
#[must_use]
pub fn cgpa_display(record: &GradeRecord) -> String {
    record
        .cgpa
        .map_or_else(|| UNAVAILABLE.to_string(), format_grade_point)
}

/// A semester's SGPA for display, or [`UNAVAILABLE`].
#[must_use]
pub fn sgpa_display(semester: &Semester) -> String {
    semester
        .sgpa
        .map_or_else(|| UNAVAILABLE.to_string(), format_grade_point)
}

/// Semesters in ascending semester-number order.
#[must_use]
pub fn sorted_semesters(record: &GradeRecord) -> Vec<&Semester> {
    let mut semesters: Vec<&Semester> = record.semesters.iter().collect();
    semesters.sort_by_key(|s| s.number);
    semesters
}

/// Semester selected when a detail view opens: the lowest number present.
#[must_use]
pub fn default_semester(record: &GradeRecord) -> Option<u32> {
    record.semesters.iter().map(|s| s.number).min()
}

/// Looks up one semester by number.
#[must_use]
pub fn semester_detail(record: &GradeRecord, number: u32) -> Option<&Semester> {
    record.semesters.iter().find(|s| s.number == number)
}

/// Checks the uniqueness rules of a grade record: semester numbers are unique per
/// student and subject names are unique within a semester.
pub fn validate_grades(record: &GradeRecord) -> Result<()> {
    let mut numbers = HashSet::new();
    for semester in &record.semesters {
        if !numbers.insert(semester.number) {
            return Err(Error::MalformedRecord {
                id: record.student_id.clone(),
                reason: format!("semester {} listed twice", semester.number),
            });
        }

        let mut names = HashSet::new();
        for subject in &semester.subjects {
            if !names.insert(subject.name.as_str()) {
                return Err(Error::MalformedRecord {
                    id: record.student_id.clone(),
                    reason: format!(
                        "subject {:?} listed twice in semester {}",
                        subject.name, semester.number
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Semester performance view over one student's grades.
#[derive(Debug, Clone)]
pub struct GradeRollup<'a> {
    record: &'a GradeRecord,
    semesters: Vec<&'a Semester>,
    selected: Option<u32>,
}

impl<'a> GradeRollup<'a> {
    /// Builds the view with the default semester selected.
    #[must_use]
    pub fn new(record: &'a GradeRecord) -> Self {
        Self {
            record,
            semesters: sorted_semesters(record),
            selected: default_semester(record),
        }
    }

    /// CGPA for display.
    #[must_use]
    pub fn cgpa(&self) -> String {
        cgpa_display(self.record)
    }

    /// Semesters in ascending order.
    #[must_use]
    pub fn semesters(&self) -> &[&'a Semester] {
        &self.semesters
    }

    /// Number of the selected semester, `None` when the student has no semesters.
    #[must_use]
    pub const fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Switches the detail view to another semester.
    pub fn select(&mut self, number: u32) -> Result<&'a Semester> {
        let semester = semester_detail(self.record, number)
            .ok_or_else(|| Error::validation(format!("no semester {number} in grade record")))?;
        self.selected = Some(number);
        Ok(semester)
    }

    /// The selected semester's detail.
    #[must_use]
    pub fn selected_semester(&self) -> Option<&'a Semester> {
        self.selected
            .and_then(|number| semester_detail(self.record, number))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_semesters_sorted_ascending() {
        let record = sample_grades();
        let numbers: Vec<u32> = sorted_semesters(&record).iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_semester_is_minimum() {
        let record = sample_grades();
        assert_eq!(default_semester(&record), Some(1));
        assert_eq!(default_semester(&GradeRecord::default()), None);
    }

    #[test]
    fn test_cgpa_is_displayed_as_published() {
        let mut record = sample_grades();
        assert_eq!(cgpa_display(&record), "8.4");
        record.cgpa = Some(9.0);
        assert_eq!(cgpa_display(&record), "9");
        record.cgpa = None;
        assert_eq!(cgpa_display(&record), "N/A");
    }

    #[test]
    fn test_rollup_selection() {
        let record = sample_grades();
        let mut rollup = GradeRollup::new(&record);
        assert_eq!(rollup.selected(), Some(1));
        assert_eq!(rollup.selected_semester().unwrap().subjects.len(), 2);

        let third = rollup.select(3).unwrap();
        assert_eq!(third.number, 3);
        assert_eq!(rollup.selected(), Some(3));

        assert!(matches!(rollup.select(8), Err(Error::Validation { .. })));
        assert_eq!(rollup.selected(), Some(3));
    }

    #[test]
    fn test_validate_grades_rejects_duplicates() {
        let mut record = sample_grades();
        assert!(validate_grades(&record).is_ok());

        let copy = record.semesters[0].clone();
        record.semesters.push(copy);
        assert!(matches!(
            validate_grades(&record),
            Err(Error::MalformedRecord { .. })
        ));

        let mut record = sample_grades();
        let subject = record.semesters[0].subjects[0].clone();
        record.semesters[0].subjects.push(subject);
        assert!(validate_grades(&record).is_err());
    }
}
