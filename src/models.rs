//! Course and assignment records.
//!
//! Records serialize with camelCase keys so collections written by earlier
//! versions of the tracker load without conversion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An enrolled course. `credits` weights the course in the GPA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub code: String,
    pub credits: f64,
    pub color: String,
    pub instructor: String,
    pub semester: String,
    pub created_at: DateTime<Utc>,
}

/// Every course attribute except `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFields {
    pub name: String,
    pub code: String,
    pub credits: f64,
    pub color: String,
    pub instructor: String,
    pub semester: String,
}

impl Course {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, fields: CourseFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            code: fields.code,
            credits: fields.credits,
            color: fields.color,
            instructor: fields.instructor,
            semester: fields.semester,
            created_at,
        }
    }

    /// Replaces every mutable field, keeping `id` and `created_at`.
    pub fn replace_fields(&mut self, fields: CourseFields) {
        self.name = fields.name;
        self.code = fields.code;
        self.credits = fields.credits;
        self.color = fields.color;
        self.instructor = fields.instructor;
        self.semester = fields.semester;
    }

    pub fn fields(&self) -> CourseFields {
        CourseFields {
            name: self.name.clone(),
            code: self.code.clone(),
            credits: self.credits,
            color: self.color.clone(),
            instructor: self.instructor.clone(),
            semester: self.semester.clone(),
        }
    }
}

/// Kind of gradable work. Only affects how an assignment is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Exam,
    Quiz,
    Homework,
    Project,
    Participation,
}

impl AssignmentType {
    pub const ALL: [AssignmentType; 5] = [
        AssignmentType::Exam,
        AssignmentType::Quiz,
        AssignmentType::Homework,
        AssignmentType::Project,
        AssignmentType::Participation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentType::Exam => "exam",
            AssignmentType::Quiz => "quiz",
            AssignmentType::Homework => "homework",
            AssignmentType::Project => "project",
            AssignmentType::Participation => "participation",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown assignment type '{s}'"))
    }
}

/// A single gradable item belonging to one course.
///
/// `earned_points` is `None` until the work has been graded; that is not
/// the same as a score of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub total_points: f64,
    pub earned_points: Option<f64>,
    pub due_date: NaiveDate,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Every assignment attribute except `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFields {
    pub course_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub total_points: f64,
    pub earned_points: Option<f64>,
    pub due_date: NaiveDate,
    pub is_completed: bool,
}

impl Assignment {
    pub fn new(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        fields: AssignmentFields,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: fields.course_id,
            title: fields.title,
            description: fields.description,
            kind: fields.kind,
            total_points: fields.total_points,
            earned_points: fields.earned_points,
            due_date: fields.due_date,
            is_completed: fields.is_completed,
            created_at,
        }
    }

    /// Replaces every mutable field, keeping `id` and `created_at`.
    pub fn replace_fields(&mut self, fields: AssignmentFields) {
        self.course_id = fields.course_id;
        self.title = fields.title;
        self.description = fields.description;
        self.kind = fields.kind;
        self.total_points = fields.total_points;
        self.earned_points = fields.earned_points;
        self.due_date = fields.due_date;
        self.is_completed = fields.is_completed;
    }

    pub fn fields(&self) -> AssignmentFields {
        AssignmentFields {
            course_id: self.course_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.kind,
            total_points: self.total_points,
            earned_points: self.earned_points,
            due_date: self.due_date,
            is_completed: self.is_completed,
        }
    }

    /// Score of this single assignment as a percentage, `None` while ungraded.
    pub fn percentage(&self) -> Option<f64> {
        let earned = self.earned_points?;
        if self.total_points == 0.0 {
            Some(0.0)
        } else {
            Some(earned / self.total_points * 100.0)
        }
    }

    /// Incomplete work due today or earlier. Due dates fall at the start of
    /// the day, so work due today is already late.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due_date <= today
    }

    /// Whole days from `today` until the due date; negative once overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}
