//! Mock student portal sign-in. One fixed account, no sessions, no lockout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, info};

const DEMO_USERNAME: &str = "student@hopn.edu";
const DEMO_PASSWORD: &str = "password123";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The account shown on the dashboard after signing in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_id: String,
    pub program: String,
    pub enrollment_date: NaiveDate,
}

impl StudentUser {
    pub fn demo() -> Self {
        Self {
            id: "1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: DEMO_USERNAME.to_string(),
            student_id: "STU2024001".to_string(),
            program: "Bachelor of Science in Computer Science".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Accept the single demo account. Every other input gets the same generic failure.
pub fn authenticate(credentials: &Credentials) -> Result<StudentUser, AuthError> {
    let username_ok = constant_time_eq(&credentials.username, DEMO_USERNAME);
    let password_ok = constant_time_eq(&credentials.password, DEMO_PASSWORD);

    if username_ok && password_ok {
        info!(student_id = "STU2024001", "portal sign-in");
        Ok(StudentUser::demo())
    } else {
        debug!("portal sign-in rejected");
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn demo_account_signs_in() {
        let user = authenticate(&credentials("student@hopn.edu", "password123"))
            .expect("demo credentials accepted");
        assert_eq!(user.full_name(), "John Doe");
        assert_eq!(user.student_id, "STU2024001");
        assert_eq!(
            user.enrollment_date,
            NaiveDate::from_ymd_opt(2024, 9, 1).expect("valid date")
        );
    }

    #[test]
    fn anything_else_is_rejected_generically() {
        for (username, password) in [
            ("student@hopn.edu", "password124"),
            ("admin@hopn.edu", "password123"),
            ("", ""),
            ("student@hopn.edu", "PASSWORD123"),
            (" student@hopn.edu ", "password123"),
            ("Student@hopn.edu", "password123"),
        ] {
            assert_eq!(
                authenticate(&credentials(username, password)),
                Err(AuthError::InvalidCredentials)
            );
        }
    }

    #[test]
    fn user_serializes_for_the_dashboard() {
        let json = serde_json::to_value(StudentUser::demo()).expect("serializes");
        assert_eq!(json["studentId"], "STU2024001");
        assert_eq!(json["enrollmentDate"], "2024-09-01");
    }
}
