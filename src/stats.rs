use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::grades::utility::mean;
use crate::grades::{GradeBand, LetterGrade, course_grade, gpa, letter_grade};
use crate::models::{Assignment, Course};
use crate::views::{DASHBOARD_LIMIT, course_assignments, upcoming_assignments};

/// Headline numbers shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub generated_at: DateTime<Utc>,
    pub total_courses: usize,
    pub total_assignments: usize,
    pub completed_assignments: usize,
    pub upcoming_assignments: usize,

    // grades
    pub average_grade: f64,
    pub gpa: f64,
    pub letter_grade: LetterGrade,
}

impl DashboardStats {
    pub fn compute(courses: &[Course], assignments: &[Assignment], today: NaiveDate) -> Self {
        let completed: Vec<&Assignment> = assignments.iter().filter(|a| a.is_completed).collect();

        let percentages: Vec<f64> = completed
            .iter()
            .map(|a| Self::pct(a.earned_points.unwrap_or(0.0), a.total_points))
            .collect();

        let gpa = gpa(courses, assignments);

        DashboardStats {
            generated_at: Utc::now(),
            total_courses: courses.len(),
            total_assignments: assignments.len(),
            completed_assignments: completed.len(),
            upcoming_assignments: upcoming_assignments(assignments, today, DASHBOARD_LIMIT).len(),
            average_grade: mean(&percentages),
            gpa,
            // 4.0 scale stretched onto 0-100
            letter_grade: letter_grade(gpa * 25.0),
        }
    }

    pub fn pct(part: f64, total: f64) -> f64 {
        if total == 0.0 {
            0.0
        } else {
            (part / total) * 100.0
        }
    }
}

/// One row of the course overview.
#[derive(Debug, Serialize)]
pub struct CourseSummary {
    pub course_id: String,
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub semester: String,
    pub credits: f64,
    pub completed_assignments: usize,
    pub total_assignments: usize,
    /// `None` until at least one assignment is completed.
    pub current_grade: Option<f64>,
    pub letter_grade: Option<LetterGrade>,
    pub band: Option<GradeBand>,
}

impl CourseSummary {
    pub fn for_course(course: &Course, assignments: &[Assignment]) -> Self {
        let all = course_assignments(assignments, &course.id);
        let completed: Vec<&Assignment> = all.iter().copied().filter(|a| a.is_completed).collect();

        let current_grade = if completed.is_empty() {
            None
        } else {
            Some(course_grade(completed.iter().copied()))
        };

        CourseSummary {
            course_id: course.id.clone(),
            code: course.code.clone(),
            name: course.name.clone(),
            instructor: course.instructor.clone(),
            semester: course.semester.clone(),
            credits: course.credits,
            completed_assignments: completed.len(),
            total_assignments: all.len(),
            current_grade,
            letter_grade: current_grade.map(letter_grade),
            band: current_grade.map(GradeBand::from_percentage),
        }
    }

    /// Summaries for every course, in course order.
    pub fn for_all(courses: &[Course], assignments: &[Assignment]) -> Vec<Self> {
        courses
            .iter()
            .map(|c| Self::for_course(c, assignments))
            .collect()
    }

    /// Current grade formatted with one decimal, or `N/A`.
    pub fn grade_label(&self) -> String {
        match self.current_grade {
            Some(g) => format!("{g:.1}%"),
            None => "N/A".to_string(),
        }
    }
}
