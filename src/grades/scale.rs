use serde::{Serialize, Serializer};
use std::fmt;

/// Letter tier for a percentage, from `A+` down to `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterGrade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LetterGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Minimum percentage, letter, and grade point for each tier, highest first.
/// Anything below the last threshold is an `F` worth 0.0.
static GRADE_SCALE: &[(f64, LetterGrade, f64)] = &[
    (97.0, LetterGrade::APlus, 4.0),
    (93.0, LetterGrade::A, 4.0),
    (90.0, LetterGrade::AMinus, 3.7),
    (87.0, LetterGrade::BPlus, 3.3),
    (83.0, LetterGrade::B, 3.0),
    (80.0, LetterGrade::BMinus, 2.7),
    (77.0, LetterGrade::CPlus, 2.3),
    (73.0, LetterGrade::C, 2.0),
    (70.0, LetterGrade::CMinus, 1.7),
    (67.0, LetterGrade::DPlus, 1.3),
    (63.0, LetterGrade::D, 1.0),
    (60.0, LetterGrade::DMinus, 0.7),
];

fn tier(percentage: f64) -> Option<&'static (f64, LetterGrade, f64)> {
    GRADE_SCALE
        .iter()
        .find(|(threshold, _, _)| percentage >= *threshold)
}

/// Converts a percentage (0–100) into a letter grade.
///
/// | Range  | Grade |
/// |--------|-------|
/// | >= 97  | A+    |
/// | >= 93  | A     |
/// | >= 90  | A-    |
/// | >= 87  | B+    |
/// | >= 83  | B     |
/// | >= 80  | B-    |
/// | >= 77  | C+    |
/// | >= 73  | C     |
/// | >= 70  | C-    |
/// | >= 67  | D+    |
/// | >= 63  | D     |
/// | >= 60  | D-    |
/// | < 60   | F     |
pub fn letter_grade(percentage: f64) -> LetterGrade {
    tier(percentage).map_or(LetterGrade::F, |(_, letter, _)| *letter)
}

/// Converts a percentage into grade points on the 4.0 scale, using the same
/// thresholds as [`letter_grade`]. `A+` and `A` both earn 4.0.
pub fn grade_point(percentage: f64) -> f64 {
    tier(percentage).map_or(0.0, |(_, _, points)| *points)
}

/// Coarse display band used to highlight a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Failing,
}

impl GradeBand {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => GradeBand::Excellent,
            p if p >= 80.0 => GradeBand::Good,
            p if p >= 70.0 => GradeBand::Fair,
            p if p >= 60.0 => GradeBand::Poor,
            _ => GradeBand::Failing,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GradeBand::Excellent => "excellent",
            GradeBand::Good => "good",
            GradeBand::Fair => "fair",
            GradeBand::Poor => "poor",
            GradeBand::Failing => "failing",
        }
    }
}
