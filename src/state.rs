//! The gradebook state container.
//!
//! [`Gradebook`] holds both collections and changes only through
//! [`Gradebook::apply`]. [`Tracker`] pairs a gradebook with a
//! [`KeyValueStore`] and persists after every successful transition.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Assignment, AssignmentFields, Course, CourseFields};
use crate::storage::{
    ASSIGNMENTS_KEY, COURSES_KEY, KeyValueStore, encode_collection, load_collection,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("course '{0}' not found")]
    CourseNotFound(String),

    #[error("assignment '{0}' not found")]
    AssignmentNotFound(String),

    #[error("a record with id '{0}' already exists")]
    DuplicateId(String),

    #[error("assignment refers to unknown course '{0}'")]
    UnknownCourse(String),
}

/// A single change to the gradebook.
#[derive(Debug, Clone)]
pub enum Action {
    AddCourse {
        id: String,
        created_at: DateTime<Utc>,
        fields: CourseFields,
    },
    UpdateCourse {
        id: String,
        fields: CourseFields,
    },
    /// Also removes every assignment of the course.
    DeleteCourse {
        id: String,
    },
    AddAssignment {
        id: String,
        created_at: DateTime<Utc>,
        fields: AssignmentFields,
    },
    UpdateAssignment {
        id: String,
        fields: AssignmentFields,
    },
    /// Flips completion. Completing ungraded work records full marks.
    ToggleComplete {
        id: String,
    },
    DeleteAssignment {
        id: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradebook {
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
}

impl Gradebook {
    pub fn new(courses: Vec<Course>, assignments: Vec<Assignment>) -> Self {
        Self {
            courses,
            assignments,
        }
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// Returns the gradebook with `action` applied, or the reason it cannot be.
    pub fn apply(mut self, action: Action) -> Result<Self, StateError> {
        match action {
            Action::AddCourse {
                id,
                created_at,
                fields,
            } => {
                if self.course(&id).is_some() {
                    return Err(StateError::DuplicateId(id));
                }
                self.courses.push(Course::new(id, created_at, fields));
            }
            Action::UpdateCourse { id, fields } => {
                let course = self
                    .courses
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or(StateError::CourseNotFound(id))?;
                course.replace_fields(fields);
            }
            Action::DeleteCourse { id } => {
                if self.course(&id).is_none() {
                    return Err(StateError::CourseNotFound(id));
                }
                self.courses.retain(|c| c.id != id);
                let before = self.assignments.len();
                self.assignments.retain(|a| a.course_id != id);
                debug!(
                    course_id = %id,
                    removed_assignments = before - self.assignments.len(),
                    "Cascade-deleted course assignments"
                );
            }
            Action::AddAssignment {
                id,
                created_at,
                fields,
            } => {
                if self.assignment(&id).is_some() {
                    return Err(StateError::DuplicateId(id));
                }
                if self.course(&fields.course_id).is_none() {
                    return Err(StateError::UnknownCourse(fields.course_id));
                }
                self.assignments
                    .push(Assignment::new(id, created_at, fields));
            }
            Action::UpdateAssignment { id, fields } => {
                if self.course(&fields.course_id).is_none() {
                    return Err(StateError::UnknownCourse(fields.course_id));
                }
                let assignment = self
                    .assignments
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(StateError::AssignmentNotFound(id))?;
                assignment.replace_fields(fields);
            }
            Action::ToggleComplete { id } => {
                let assignment = self
                    .assignments
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(StateError::AssignmentNotFound(id))?;
                let mut fields = assignment.fields();
                fields.is_completed = !fields.is_completed;
                if fields.is_completed && fields.earned_points.is_none() {
                    fields.earned_points = Some(fields.total_points);
                }
                assignment.replace_fields(fields);
            }
            Action::DeleteAssignment { id } => {
                if self.assignment(&id).is_none() {
                    return Err(StateError::AssignmentNotFound(id));
                }
                self.assignments.retain(|a| a.id != id);
            }
        }

        Ok(self)
    }
}

/// A gradebook backed by a key-value store.
pub struct Tracker<S: KeyValueStore> {
    store: S,
    book: Gradebook,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Loads both collections from `store`. Missing or unreadable entries
    /// start out empty.
    pub fn open(store: S) -> Self {
        let courses: Vec<Course> = load_collection(&store, COURSES_KEY);
        let assignments: Vec<Assignment> = load_collection(&store, ASSIGNMENTS_KEY);
        info!(
            courses = courses.len(),
            assignments = assignments.len(),
            "Gradebook loaded"
        );

        Self {
            store,
            book: Gradebook::new(courses, assignments),
        }
    }

    pub fn gradebook(&self) -> &Gradebook {
        &self.book
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies `action` and writes both collections back to the store in a
    /// single batch.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the action does not fit the current
    /// gradebook, or an I/O error from the store. In either case neither the
    /// store nor the in-memory gradebook changes.
    pub fn dispatch(&mut self, action: Action) -> anyhow::Result<()> {
        debug!(?action, "Dispatching action");
        let next = self.book.clone().apply(action)?;

        self.store.set_many(vec![
            (COURSES_KEY, encode_collection(COURSES_KEY, &next.courses)?),
            (ASSIGNMENTS_KEY, encode_collection(ASSIGNMENTS_KEY, &next.assignments)?),
        ])?;

        self.book = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentType;
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    }

    fn course_fields(name: &str) -> CourseFields {
        CourseFields {
            name: name.to_string(),
            code: "CS101".to_string(),
            credits: 3.0,
            color: "bg-blue-500".to_string(),
            instructor: "Dr. Chen".to_string(),
            semester: "Fall 2024".to_string(),
        }
    }

    fn assignment_fields(course_id: &str, earned: Option<f64>) -> AssignmentFields {
        AssignmentFields {
            course_id: course_id.to_string(),
            title: "Problem set".to_string(),
            description: "Chapter 2".to_string(),
            kind: AssignmentType::Homework,
            total_points: 20.0,
            earned_points: earned,
            due_date: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
            is_completed: false,
        }
    }

    fn add_course(id: &str) -> Action {
        Action::AddCourse {
            id: id.to_string(),
            created_at: now(),
            fields: course_fields("Intro to Programming"),
        }
    }

    fn add_assignment(id: &str, course_id: &str, earned: Option<f64>) -> Action {
        Action::AddAssignment {
            id: id.to_string(),
            created_at: now(),
            fields: assignment_fields(course_id, earned),
        }
    }

    fn seeded() -> Gradebook {
        Gradebook::default()
            .apply(add_course("c1"))
            .and_then(|b| b.apply(add_course("c2")))
            .and_then(|b| b.apply(add_assignment("a1", "c1", None)))
            .and_then(|b| b.apply(add_assignment("a2", "c1", Some(10.0))))
            .and_then(|b| b.apply(add_assignment("a3", "c2", None)))
            .unwrap()
    }

    #[test]
    fn test_add_course() {
        let book = Gradebook::default().apply(add_course("c1")).unwrap();

        assert_eq!(book.courses.len(), 1);
        assert_eq!(book.courses[0].created_at, now());
    }

    #[test]
    fn test_add_duplicate_course_rejected() {
        let book = Gradebook::default().apply(add_course("c1")).unwrap();

        let err = book.apply(add_course("c1")).unwrap_err();

        assert_eq!(err, StateError::DuplicateId("c1".to_string()));
    }

    #[test]
    fn test_update_course_replaces_fields() {
        let book = seeded();
        let mut fields = course_fields("Data Structures");
        fields.credits = 4.0;

        let book = book
            .apply(Action::UpdateCourse {
                id: "c1".to_string(),
                fields,
            })
            .unwrap();

        let course = book.course("c1").unwrap();
        assert_eq!(course.name, "Data Structures");
        assert_eq!(course.credits, 4.0);
        assert_eq!(course.created_at, now());
    }

    #[test]
    fn test_update_missing_course() {
        let err = Gradebook::default()
            .apply(Action::UpdateCourse {
                id: "nope".to_string(),
                fields: course_fields("x"),
            })
            .unwrap_err();

        assert_eq!(err, StateError::CourseNotFound("nope".to_string()));
    }

    #[test]
    fn test_delete_course_cascades() {
        let book = seeded()
            .apply(Action::DeleteCourse {
                id: "c1".to_string(),
            })
            .unwrap();

        assert!(book.course("c1").is_none());
        assert_eq!(book.assignments.len(), 1);
        assert_eq!(book.assignments[0].id, "a3");
    }

    #[test]
    fn test_add_assignment_requires_course() {
        let err = Gradebook::default()
            .apply(add_assignment("a1", "ghost", None))
            .unwrap_err();

        assert_eq!(err, StateError::UnknownCourse("ghost".to_string()));
    }

    #[test]
    fn test_update_assignment_full_replacement() {
        let mut fields = assignment_fields("c2", Some(18.0));
        fields.title = "Moved".to_string();
        fields.is_completed = true;

        let book = seeded()
            .apply(Action::UpdateAssignment {
                id: "a1".to_string(),
                fields,
            })
            .unwrap();

        let a = book.assignment("a1").unwrap();
        assert_eq!(a.course_id, "c2");
        assert_eq!(a.title, "Moved");
        assert_eq!(a.earned_points, Some(18.0));
        assert!(a.is_completed);
        assert_eq!(a.created_at, now());
    }

    #[test]
    fn test_toggle_complete_fills_earned_points() {
        let book = seeded()
            .apply(Action::ToggleComplete {
                id: "a1".to_string(),
            })
            .unwrap();

        let a = book.assignment("a1").unwrap();
        assert!(a.is_completed);
        assert_eq!(a.earned_points, Some(20.0));

        let book = book
            .apply(Action::ToggleComplete {
                id: "a1".to_string(),
            })
            .unwrap();

        let a = book.assignment("a1").unwrap();
        assert!(!a.is_completed);
        assert_eq!(a.earned_points, Some(20.0));
    }

    #[test]
    fn test_toggle_complete_keeps_existing_score() {
        let book = seeded()
            .apply(Action::ToggleComplete {
                id: "a2".to_string(),
            })
            .unwrap();

        assert_eq!(book.assignment("a2").unwrap().earned_points, Some(10.0));
    }

    #[test]
    fn test_delete_assignment() {
        let book = seeded()
            .apply(Action::DeleteAssignment {
                id: "a2".to_string(),
            })
            .unwrap();

        assert!(book.assignment("a2").is_none());
        assert_eq!(book.assignments.len(), 2);

        let err = book
            .apply(Action::DeleteAssignment {
                id: "a2".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, StateError::AssignmentNotFound("a2".to_string()));
    }

    #[test]
    fn test_tracker_persists_after_dispatch() {
        let mut tracker = Tracker::open(MemoryStore::default());

        tracker.dispatch(add_course("c1")).unwrap();
        tracker.dispatch(add_assignment("a1", "c1", None)).unwrap();

        let reopened = Tracker::open(tracker.store().clone());
        assert_eq!(reopened.gradebook(), tracker.gradebook());
        assert_eq!(reopened.gradebook().assignments.len(), 1);
    }

    #[test]
    fn test_tracker_rejected_action_leaves_state() {
        let mut tracker = Tracker::open(MemoryStore::default());
        tracker.dispatch(add_course("c1")).unwrap();

        let err = tracker
            .dispatch(add_assignment("a1", "missing", None))
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<StateError>(),
            Some(&StateError::UnknownCourse("missing".to_string()))
        );
        assert!(tracker.gradebook().assignments.is_empty());
    }

    /// Fails every write to the assignments entry.
    #[derive(Clone, Default)]
    struct AssignmentsWriteFails {
        inner: MemoryStore,
    }

    impl KeyValueStore for AssignmentsWriteFails {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
            if key == ASSIGNMENTS_KEY {
                anyhow::bail!("write to '{key}' failed");
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_save_keeps_store_and_gradebook_consistent() {
        let mut seeded = MemoryStore::default();
        let course = Course::new("c1", now(), course_fields("Databases"));
        let assignment = Assignment::new("a1", now(), assignment_fields("c1", None));
        seeded
            .set(COURSES_KEY, serde_json::to_string(&[&course]).unwrap())
            .unwrap();
        seeded
            .set(ASSIGNMENTS_KEY, serde_json::to_string(&[&assignment]).unwrap())
            .unwrap();

        let mut tracker = Tracker::open(AssignmentsWriteFails { inner: seeded });
        let before = tracker.gradebook().clone();

        let result = tracker.dispatch(Action::DeleteCourse {
            id: "c1".to_string(),
        });

        assert!(result.is_err());
        assert_eq!(tracker.gradebook(), &before);

        // the store still holds the course its assignment refers to
        let reopened = Tracker::open(tracker.store().clone());
        assert_eq!(reopened.gradebook(), &before);
        assert_eq!(reopened.gradebook().assignments[0].course_id, "c1");
    }
}
