//! Filtered and sorted slices of the assignment list.
//!
//! All sorts are stable, so records that tie on the sort key keep the order
//! in which they were added.

use chrono::NaiveDate;

use crate::models::Assignment;

/// Number of rows shown in the dashboard's upcoming and recent lists.
pub const DASHBOARD_LIMIT: usize = 5;

/// Every assignment belonging to `course_id`, in insertion order.
pub fn course_assignments<'a>(
    assignments: &'a [Assignment],
    course_id: &str,
) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| a.course_id == course_id)
        .collect()
}

/// The completed assignments belonging to `course_id`, i.e. the ones its
/// current grade is computed from.
pub fn completed_for_course<'a>(
    assignments: &'a [Assignment],
    course_id: &str,
) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| a.course_id == course_id && a.is_completed)
        .collect()
}

/// Incomplete assignments due after `today`, soonest first, at most `limit`.
pub fn upcoming_assignments(
    assignments: &[Assignment],
    today: NaiveDate,
    limit: usize,
) -> Vec<&Assignment> {
    let mut upcoming: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| !a.is_completed && a.due_date > today)
        .collect();

    upcoming.sort_by_key(|a| a.due_date);
    upcoming.truncate(limit);
    upcoming
}

/// Completed, graded assignments, most recently created first, at most `limit`.
pub fn recent_grades(assignments: &[Assignment], limit: usize) -> Vec<&Assignment> {
    let mut graded: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| a.is_completed && a.earned_points.is_some())
        .collect();

    graded.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    graded.truncate(limit);
    graded
}

/// Incomplete assignments due on or before `today`.
pub fn overdue_assignments(assignments: &[Assignment], today: NaiveDate) -> Vec<&Assignment> {
    assignments.iter().filter(|a| a.is_overdue(today)).collect()
}
