use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::error::FetchError;
use crate::models::{Course, NewCourseRequest, UpdateCourseRequest};

const MIN_NAME_LEN: usize = 3;

/// In-memory course collection. The store is the single owner of the
/// records; the service layer only touches them through these operations.
/// Deletion is logical: records are flagged inactive and kept, and the read
/// paths (`list`, `get`) only ever return active records.
pub struct CourseStore {
    courses: Mutex<Vec<Course>>,
}

impl CourseStore {
    pub fn new(seed: Vec<Course>) -> Self {
        Self {
            courses: Mutex::new(seed),
        }
    }

    /// The fixed five-course data set every process starts from.
    pub fn seeded() -> Self {
        let now = Utc::now().to_rfc3339();
        let seed = [
            (
                1,
                "Introduction to Computer Science",
                "Foundations of programming and computational thinking.",
                "12 weeks",
                "Dr. Alan Reyes",
                42,
            ),
            (
                2,
                "Data Structures and Algorithms",
                "Core collections, complexity analysis and classic algorithms.",
                "10 weeks",
                "Prof. Maria Chen",
                35,
            ),
            (
                3,
                "Database Systems",
                "Relational modeling, SQL and transaction basics.",
                "8 weeks",
                "Dr. Samuel Okafor",
                28,
            ),
            (
                4,
                "Web Application Development",
                "Building and deploying full-stack web applications.",
                "12 weeks",
                "Prof. Elena Vasquez",
                51,
            ),
            (
                5,
                "Operating Systems",
                "Processes, memory management and file systems.",
                "14 weeks",
                "Dr. James Park",
                19,
            ),
        ];

        let courses = seed
            .into_iter()
            .map(
                |(id, name, description, duration, instructor, enrollment_count)| Course {
                    id,
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    duration: Some(duration.to_string()),
                    instructor: Some(instructor.to_string()),
                    enrollment_count,
                    is_active: true,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                },
            )
            .collect();

        Self::new(courses)
    }

    fn courses(&self) -> MutexGuard<'_, Vec<Course>> {
        self.courses.lock().expect("course store mutex poisoned")
    }

    /// All active courses in insertion order.
    pub fn list(&self) -> Vec<Course> {
        self.courses()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect()
    }

    /// Every record, active or not. Inspection helper; the read path the
    /// dashboard sees is [`CourseStore::list`].
    pub fn all(&self) -> Vec<Course> {
        self.courses().clone()
    }

    pub fn get(&self, id: i64) -> Result<Course, FetchError> {
        self.courses()
            .iter()
            .find(|c| c.id == id && c.is_active)
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    /// Validates the name, assigns the next id (max existing + 1, starting
    /// at 1 for an empty store) and appends the record.
    pub fn insert(&self, req: NewCourseRequest) -> Result<Course, FetchError> {
        validate_name(&req.name)?;

        let mut courses = self.courses();
        let id = courses.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let now = Utc::now().to_rfc3339();

        let course = Course {
            id,
            name: req.name,
            description: req.description,
            duration: req.duration,
            instructor: req.instructor,
            enrollment_count: 0,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        courses.push(course.clone());
        Ok(course)
    }

    /// Shallow merge: only the supplied fields change. Works on inactive
    /// records too, as long as the id exists.
    pub fn update(&self, id: i64, req: UpdateCourseRequest) -> Result<Course, FetchError> {
        if let Some(name) = &req.name {
            validate_name(name)?;
        }

        let mut courses = self.courses();
        let course = courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(FetchError::NotFound)?;

        if let Some(name) = req.name {
            course.name = name;
        }
        if let Some(description) = req.description {
            course.description = Some(description);
        }
        if let Some(duration) = req.duration {
            course.duration = Some(duration);
        }
        if let Some(instructor) = req.instructor {
            course.instructor = Some(instructor);
        }
        if let Some(enrollment_count) = req.enrollment_count {
            course.enrollment_count = enrollment_count;
        }
        course.updated_at = Utc::now().to_rfc3339();

        Ok(course.clone())
    }

    /// Flags the record inactive and keeps it.
    pub fn soft_delete(&self, id: i64) -> Result<bool, FetchError> {
        let mut courses = self.courses();
        let course = courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(FetchError::NotFound)?;

        course.is_active = false;
        course.updated_at = Utc::now().to_rfc3339();
        Ok(true)
    }
}

fn validate_name(name: &str) -> Result<(), FetchError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(FetchError::Validation(format!(
            "course name must be at least {} characters",
            MIN_NAME_LEN
        )));
    }
    Ok(())
}
