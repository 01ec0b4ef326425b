//! Request DTOs.
//!
//! Every field that the validation rules treat as "required" is an `Option`
//! here: a missing or blank field must produce the surface's 400 message, not
//! a deserializer rejection.

use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Defaults to `student` when absent, mirroring the registration form.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    #[serde(rename = "courseId")]
    pub course_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

// -------------------------
// Helpers
// -------------------------

/// A required text field: present and not blank.
pub fn required(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank_values() {
        assert_eq!(required(&None), None);
        assert_eq!(required(&Some(String::new())), None);
        assert_eq!(required(&Some("   ".to_string())), None);
        assert_eq!(required(&Some("  ana  ".to_string())), Some("ana"));
    }

    #[test]
    fn enroll_request_reads_the_camel_case_wire_name() {
        let req: EnrollRequest = serde_json::from_str(r#"{"courseId": "abc"}"#).unwrap();
        assert_eq!(req.course_id.as_deref(), Some("abc"));
    }
}
