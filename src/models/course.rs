use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub instructor: Option<String>,
    pub enrollment_count: u32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub instructor: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub instructor: Option<String>,
    pub enrollment_count: Option<u32>,
}
