//! CLI entry point for the grade tracker.
//!
//! Provides subcommands for managing courses and assignments, showing the
//! dashboard, and exporting per-course grades.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use grade_tracker::grades::letter_grade;
use grade_tracker::models::{AssignmentFields, AssignmentType, CourseFields};
use grade_tracker::output::{print_pretty, to_json, write_course_summaries};
use grade_tracker::state::{Action, Tracker};
use grade_tracker::stats::{CourseSummary, DashboardStats};
use grade_tracker::storage::{FileStore, KeyValueStore};
use grade_tracker::views::{
    DASHBOARD_LIMIT, course_assignments, overdue_assignments, recent_grades, upcoming_assignments,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "grade_tracker")]
#[command(about = "Track courses, assignments, grades and GPA", long_about = None)]
struct Cli {
    /// JSON file holding the stored courses and assignments
    #[arg(long, global = true, env = "GRADE_TRACKER_STORE", default_value = "grade_tracker.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a course
    AddCourse(CourseArgs),
    /// Change a course; omitted options keep their current value
    UpdateCourse {
        id: String,
        #[command(flatten)]
        changes: CourseChanges,
    },
    /// Delete a course and all of its assignments
    DeleteCourse { id: String },
    /// List courses with their current grade
    Courses,
    /// Add an assignment to a course
    AddAssignment(AssignmentArgs),
    /// Change an assignment; omitted options keep their current value
    UpdateAssignment {
        id: String,
        #[command(flatten)]
        changes: AssignmentChanges,
    },
    /// Mark an assignment complete or incomplete
    ToggleComplete { id: String },
    /// Delete an assignment
    DeleteAssignment { id: String },
    /// List assignments, optionally for a single course
    Assignments {
        #[arg(long)]
        course: Option<String>,
    },
    /// Show GPA, totals, upcoming work and recent grades
    Dashboard {
        /// Print the statistics as JSON instead
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write per-course grades to a CSV file
    Export {
        #[arg(value_name = "FILE", default_value = "grades.csv")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct CourseArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    code: String,
    #[arg(long, default_value_t = 3.0, value_parser = parse_credits)]
    credits: f64,
    #[arg(long, default_value = "bg-blue-500")]
    color: String,
    #[arg(long, default_value = "")]
    instructor: String,
    #[arg(long, default_value = "")]
    semester: String,
}

impl From<CourseArgs> for CourseFields {
    fn from(args: CourseArgs) -> Self {
        CourseFields {
            name: args.name,
            code: args.code,
            credits: args.credits,
            color: args.color,
            instructor: args.instructor,
            semester: args.semester,
        }
    }
}

#[derive(Args)]
struct CourseChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    code: Option<String>,
    #[arg(long, value_parser = parse_credits)]
    credits: Option<f64>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    instructor: Option<String>,
    #[arg(long)]
    semester: Option<String>,
}

impl CourseChanges {
    fn merge_into(self, mut fields: CourseFields) -> CourseFields {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(code) = self.code {
            fields.code = code;
        }
        if let Some(credits) = self.credits {
            fields.credits = credits;
        }
        if let Some(color) = self.color {
            fields.color = color;
        }
        if let Some(instructor) = self.instructor {
            fields.instructor = instructor;
        }
        if let Some(semester) = self.semester {
            fields.semester = semester;
        }
        fields
    }
}

#[derive(Args)]
struct AssignmentArgs {
    #[arg(long)]
    course: String,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long = "type", default_value = "homework")]
    kind: AssignmentType,
    #[arg(long)]
    total: f64,
    /// Points earned; leave out while the work is ungraded
    #[arg(long)]
    earned: Option<f64>,
    /// Due date as YYYY-MM-DD
    #[arg(long)]
    due: NaiveDate,
    #[arg(long, default_value_t = false)]
    completed: bool,
}

impl From<AssignmentArgs> for AssignmentFields {
    fn from(args: AssignmentArgs) -> Self {
        AssignmentFields {
            course_id: args.course,
            title: args.title,
            description: args.description,
            kind: args.kind,
            total_points: args.total,
            earned_points: args.earned,
            due_date: args.due,
            is_completed: args.completed,
        }
    }
}

#[derive(Args)]
struct AssignmentChanges {
    #[arg(long)]
    course: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long = "type")]
    kind: Option<AssignmentType>,
    #[arg(long)]
    total: Option<f64>,
    #[arg(long, conflicts_with = "ungraded")]
    earned: Option<f64>,
    /// Clear the earned points
    #[arg(long, default_value_t = false)]
    ungraded: bool,
    #[arg(long)]
    due: Option<NaiveDate>,
    #[arg(long)]
    completed: Option<bool>,
}

impl AssignmentChanges {
    fn merge_into(self, mut fields: AssignmentFields) -> AssignmentFields {
        if let Some(course) = self.course {
            fields.course_id = course;
        }
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(kind) = self.kind {
            fields.kind = kind;
        }
        if let Some(total) = self.total {
            fields.total_points = total;
        }
        if self.ungraded {
            fields.earned_points = None;
        } else if let Some(earned) = self.earned {
            fields.earned_points = Some(earned);
        }
        if let Some(due) = self.due {
            fields.due_date = due;
        }
        if let Some(completed) = self.completed {
            fields.is_completed = completed;
        }
        fields
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grade_tracker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_tracker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let store = FileStore::open(&cli.store)?;
    info!(path = %store.path().display(), "Using store");
    let mut tracker = Tracker::open(store);
    let today = Local::now().date_naive();

    match cli.command {
        Commands::AddCourse(args) => {
            let id = new_id();
            tracker.dispatch(Action::AddCourse {
                id: id.clone(),
                created_at: Utc::now(),
                fields: args.into(),
            })?;
            info!(course_id = %id, "Course added");
            println!("{id}");
        }
        Commands::UpdateCourse { id, changes } => {
            let current = tracker
                .gradebook()
                .course(&id)
                .with_context(|| format!("course '{id}' not found"))?
                .fields();
            tracker.dispatch(Action::UpdateCourse {
                id: id.clone(),
                fields: changes.merge_into(current),
            })?;
            info!(course_id = %id, "Course updated");
        }
        Commands::DeleteCourse { id } => {
            tracker.dispatch(Action::DeleteCourse { id: id.clone() })?;
            info!(course_id = %id, "Course deleted");
        }
        Commands::Courses => list_courses(&tracker),
        Commands::AddAssignment(args) => {
            let id = new_id();
            tracker.dispatch(Action::AddAssignment {
                id: id.clone(),
                created_at: Utc::now(),
                fields: args.into(),
            })?;
            info!(assignment_id = %id, "Assignment added");
            println!("{id}");
        }
        Commands::UpdateAssignment { id, changes } => {
            let current = tracker
                .gradebook()
                .assignment(&id)
                .with_context(|| format!("assignment '{id}' not found"))?
                .fields();
            tracker.dispatch(Action::UpdateAssignment {
                id: id.clone(),
                fields: changes.merge_into(current),
            })?;
            info!(assignment_id = %id, "Assignment updated");
        }
        Commands::ToggleComplete { id } => {
            tracker.dispatch(Action::ToggleComplete { id: id.clone() })?;
            let completed = tracker
                .gradebook()
                .assignment(&id)
                .is_some_and(|a| a.is_completed);
            info!(assignment_id = %id, completed, "Completion toggled");
        }
        Commands::DeleteAssignment { id } => {
            tracker.dispatch(Action::DeleteAssignment { id: id.clone() })?;
            info!(assignment_id = %id, "Assignment deleted");
        }
        Commands::Assignments { course } => list_assignments(&tracker, course.as_deref(), today)?,
        Commands::Dashboard { json } => dashboard(&tracker, today, json)?,
        Commands::Export { output } => {
            let book = tracker.gradebook();
            let summaries = CourseSummary::for_all(&book.courses, &book.assignments);
            write_course_summaries(&output, &summaries)?;
            info!(path = %output.display(), courses = summaries.len(), "Exported course grades");
        }
    }

    Ok(())
}

/// Credits must be a finite, non-negative number.
fn parse_credits(s: &str) -> Result<f64, String> {
    let credits: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if !credits.is_finite() || credits < 0.0 {
        return Err(format!("expected a finite, non-negative number, got '{s}'"));
    }
    Ok(credits)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Label for upcoming work, which is always due at least a day out.
fn due_label(days: i64) -> String {
    match days {
        1 => "Due tomorrow".to_string(),
        d => format!("Due in {d} days"),
    }
}

/// Prints every course with its current grade.
#[tracing::instrument(skip(tracker))]
fn list_courses<S: KeyValueStore>(tracker: &Tracker<S>) {
    let book = tracker.gradebook();
    if book.courses.is_empty() {
        println!("No courses yet");
        return;
    }

    for summary in CourseSummary::for_all(&book.courses, &book.assignments) {
        let letter = summary
            .letter_grade
            .map_or_else(String::new, |l| format!(" {l}"));
        let band = summary
            .band
            .map_or_else(String::new, |b| format!(" ({})", b.as_str()));
        println!(
            "{}  {} - {} [{} credits] {}  {}/{} assignments  {}{}{}",
            summary.course_id,
            summary.code,
            summary.name,
            summary.credits,
            summary.instructor,
            summary.completed_assignments,
            summary.total_assignments,
            summary.grade_label(),
            letter,
            band,
        );
    }
}

/// Prints assignments, grouped under a single course when one is given.
#[tracing::instrument(skip(tracker, today))]
fn list_assignments<S: KeyValueStore>(
    tracker: &Tracker<S>,
    course: Option<&str>,
    today: NaiveDate,
) -> Result<()> {
    let book = tracker.gradebook();

    let items = match course {
        Some(course_id) => {
            let c = book
                .course(course_id)
                .with_context(|| format!("course '{course_id}' not found"))?;
            println!("{} - {} ({})", c.code, c.name, c.instructor);
            course_assignments(&book.assignments, course_id)
        }
        None => book.assignments.iter().collect(),
    };

    if items.is_empty() {
        println!("No assignments yet");
        return Ok(());
    }

    for a in items {
        let check = if a.is_completed { "[x]" } else { "[ ]" };
        let overdue = if a.is_overdue(today) { " OVERDUE" } else { "" };
        let grade = match (a.is_completed, a.percentage(), a.earned_points) {
            (true, Some(pct), Some(earned)) => {
                format!("  {}/{} ({pct:.1}%)", earned, a.total_points)
            }
            _ => String::new(),
        };
        println!(
            "{check} {}  {} [{}] due {}{overdue}  {} pts{grade}",
            a.id,
            a.title,
            a.kind,
            a.due_date.format("%b %-d, %Y"),
            a.total_points,
        );
    }

    let overdue = overdue_assignments(&book.assignments, today).len();
    if overdue > 0 {
        warn!(overdue, "Some assignments are past due");
    }

    Ok(())
}

/// Prints the dashboard: headline stats, course overview, upcoming work
/// and recent grades.
#[tracing::instrument(skip(tracker, today))]
fn dashboard<S: KeyValueStore>(tracker: &Tracker<S>, today: NaiveDate, json: bool) -> Result<()> {
    let book = tracker.gradebook();
    let stats = DashboardStats::compute(&book.courses, &book.assignments, today);
    print_pretty(&stats);

    if json {
        println!("{}", to_json(&stats)?);
        return Ok(());
    }

    println!("Total courses: {}", stats.total_courses);
    println!("Current GPA:   {:.2} ({})", stats.gpa, stats.letter_grade);
    println!(
        "Completed:     {}/{}",
        stats.completed_assignments, stats.total_assignments
    );
    println!("Average grade: {:.1}%", stats.average_grade);
    println!("Upcoming:      {}", stats.upcoming_assignments);

    println!();
    println!("Course overview");
    for summary in CourseSummary::for_all(&book.courses, &book.assignments) {
        println!(
            "  {:<10} {:<30} {}/{} assignments  {}",
            summary.code,
            summary.name,
            summary.completed_assignments,
            summary.total_assignments,
            summary.grade_label(),
        );
    }

    let course_name = |course_id: &str| {
        book.course(course_id)
            .map_or_else(|| "(unknown course)".to_string(), |c| c.name.clone())
    };

    println!();
    println!("Upcoming assignments");
    let upcoming = upcoming_assignments(&book.assignments, today, DASHBOARD_LIMIT);
    if upcoming.is_empty() {
        println!("  No upcoming assignments");
    }
    for a in upcoming {
        println!(
            "  {:<30} {:<30} {} pts  {}",
            a.title,
            course_name(&a.course_id),
            a.total_points,
            due_label(a.days_until_due(today)),
        );
    }

    println!();
    println!("Recent grades");
    let recent = recent_grades(&book.assignments, DASHBOARD_LIMIT);
    if recent.is_empty() {
        println!("  No recent grades");
    }
    for a in recent {
        let pct = a.percentage().unwrap_or(0.0);
        println!(
            "  {:<30} {:<30} {}/{}  {pct:.1}% {}",
            a.title,
            course_name(&a.course_id),
            a.earned_points.unwrap_or(0.0),
            a.total_points,
            letter_grade(pct),
        );
    }

    Ok(())
}
