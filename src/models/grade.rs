//! Grade records - per-student semester results.
//!
//! SGPA and CGPA values are computed by the grading office and arrive as opaque
//! numbers; nothing in this crate derives one from letter grades.

use serde::{Deserialize, Serialize};

/// One subject result inside a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrade {
    /// Subject name, unique within its semester
    pub name: String,
    /// Letter grade, e.g. `"A+"`
    pub grade: String,
    /// Credit weight of the subject
    pub credits: u32,
}

/// A semester with its SGPA and subject results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    /// Semester number, unique per student
    #[serde(rename = "semester")]
    pub number: u32,
    /// Semester grade point average, when published
    #[serde(default)]
    pub sgpa: Option<f64>,
    /// Subject results
    #[serde(default)]
    pub subjects: Vec<SubjectGrade>,
}

/// All published grades for one student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    /// Student the grades belong to
    #[serde(default)]
    pub student_id: String,
    /// Cumulative grade point average; `None` when the office has not published one
    #[serde(default)]
    pub cgpa: Option<f64>,
    /// Semesters in the order the collaborator sent them
    #[serde(default)]
    pub semesters: Vec<Semester>,
}
