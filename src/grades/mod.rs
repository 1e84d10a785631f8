//! Grade aggregation.
//!
//! Turns completed assignments into course percentages, maps percentages
//! onto letter grades and the 4.0 grade-point scale, and computes the
//! credit-weighted GPA. Every function here is pure.

pub mod aggregate;
pub mod scale;
pub mod utility;

pub use aggregate::{course_grade, gpa};
pub use scale::{GradeBand, LetterGrade, grade_point, letter_grade};
