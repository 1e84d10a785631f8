use crate::grades::scale::grade_point;
use crate::models::{Assignment, Course};

/// Percentage earned across `assignments`: total earned over total possible.
///
/// The caller decides which assignments count (normally the completed ones
/// for a single course). Ungraded work contributes zero earned points.
/// Returns 0.0 for empty input or when nothing is worth any points.
pub fn course_grade<'a, I>(assignments: I) -> f64
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let (earned, possible) = assignments
        .into_iter()
        .fold((0.0, 0.0), |(earned, possible), a| {
            (earned + a.earned_points.unwrap_or(0.0), possible + a.total_points)
        });

    if possible > 0.0 {
        earned / possible * 100.0
    } else {
        0.0
    }
}

/// Credit-weighted grade point average over every course with completed work.
///
/// Each course is graded from its completed assignments only. Courses with
/// nothing completed are left out of both the weighted sum and the credit
/// total. Returns 0.0 when no course qualifies.
pub fn gpa(courses: &[Course], assignments: &[Assignment]) -> f64 {
    let mut weighted_total = 0.0;
    let mut total_credits = 0.0;

    for course in courses {
        let completed: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| a.course_id == course.id && a.is_completed)
            .collect();

        if completed.is_empty() {
            continue;
        }

        let grade = course_grade(completed);
        weighted_total += grade_point(grade) * course.credits;
        total_credits += course.credits;
    }

    if total_credits > 0.0 {
        weighted_total / total_credits
    } else {
        0.0
    }
}
