//! Student profile and onboarding.

use crate::error::{ApiError, ApiResult};
use core_auth::AuthGateway;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const OPTIONS_PATH: &str = "/api/user/profile-options";
const PROFILE_PATH: &str = "/api/user/profile";
const INTELLIGENCE_PATH: &str = "/api/student/intelligence";

/// Choices offered by the onboarding form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    pub campuses: Vec<String>,
    pub majors: Vec<String>,
    pub academic_levels: Vec<String>,
    pub credit_loads: Vec<String>,
    pub financial_aid_statuses: Vec<String>,
    pub semesters: Vec<String>,
}

/// Onboarding answers, as submitted and as read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub campus: String,
    pub major: String,
    pub academic_level: String,
    pub credit_load: String,
    pub financial_aid_status: String,
    pub international_student: bool,
    pub expected_graduation: String,
    pub current_semester: String,
}

impl StudentProfile {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("campus", &self.campus),
            ("major", &self.major),
            ("academic_level", &self.academic_level),
            ("credit_load", &self.credit_load),
            ("financial_aid_status", &self.financial_aid_status),
            ("expected_graduation", &self.expected_graduation),
            ("current_semester", &self.current_semester),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn validate(&self) -> ApiResult<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(format!(
                "Please complete all fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

/// A prompt the sidebar can offer as a one-click question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub label: String,
    pub prompt: String,
}

/// The single status insight shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInsight {
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub action: Option<SuggestedAction>,
}

#[derive(Debug, Clone)]
pub struct ProfileApi {
    gateway: Arc<AuthGateway>,
}

impl ProfileApi {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    pub async fn options(&self) -> ApiResult<ProfileOptions> {
        Ok(self.gateway.get_json(OPTIONS_PATH).await?)
    }

    pub async fn get(&self) -> ApiResult<StudentProfile> {
        Ok(self.gateway.get_json(PROFILE_PATH).await?)
    }

    /// Submit the onboarding form.
    ///
    /// Blank required fields are rejected without a request. On success the
    /// cached user is marked as having a complete profile.
    #[instrument(skip_all)]
    pub async fn save(&self, profile: &StudentProfile) -> ApiResult<()> {
        profile.validate()?;

        let store = self.gateway.store();
        let generation = store.generation();
        let _: serde_json::Value = self.gateway.post_json(PROFILE_PATH, profile).await?;
        info!(major = %profile.major, "Profile saved");

        match store.cached_user() {
            Some(mut user) if !user.profile_complete => {
                user.profile_complete = true;
                if let Err(e) = store.refresh_user(generation, user).await {
                    warn!(error = %e, "Failed to update cached user after profile save");
                }
            }
            Some(_) => {}
            None => debug!("No cached user to update"),
        }
        Ok(())
    }

    pub async fn intelligence(&self) -> ApiResult<StudentInsight> {
        Ok(self.gateway.get_json(INTELLIGENCE_PATH).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Backend, TestClient};
    use bridge_traits::HttpMethod;

    fn complete_profile() -> StudentProfile {
        StudentProfile {
            campus: "University Park".to_string(),
            major: "Computer Science".to_string(),
            academic_level: "Junior".to_string(),
            credit_load: "Full-time (12-18 credits)".to_string(),
            financial_aid_status: "Receiving aid".to_string(),
            international_student: false,
            expected_graduation: "Spring 2027".to_string(),
            current_semester: "Spring 2026".to_string(),
        }
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let profile = StudentProfile {
            major: "  ".to_string(),
            expected_graduation: String::new(),
            ..complete_profile()
        };

        assert_eq!(profile.missing_fields(), vec!["major", "expected_graduation"]);
        assert!(profile.validate().expect_err("invalid").is_validation());
        assert!(complete_profile().validate().is_ok());
    }

    #[tokio::test]
    async fn test_incomplete_form_makes_no_request() {
        let client = TestClient::signed_in(Backend::new(), false).await;

        let err = client
            .profile()
            .save(&StudentProfile::default())
            .await
            .expect_err("blank form");

        assert!(err.is_validation());
        assert_eq!(client.backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_save_marks_cached_user_complete() {
        let backend = Backend::new().on(HttpMethod::Post, PROFILE_PATH, 200, r#"{"message":"ok"}"#);
        let client = TestClient::signed_in(backend, false).await;

        client.profile().save(&complete_profile()).await.expect("saved");

        let user = client.auth().current_user().expect("cached user");
        assert!(user.profile_complete);
        let sent: StudentProfile =
            serde_json::from_slice(&client.backend.last_body().expect("body")).expect("profile");
        assert_eq!(sent, complete_profile());
    }

    #[tokio::test]
    async fn test_backend_validation_detail_is_surfaced() {
        let backend = Backend::new().on(
            HttpMethod::Post,
            PROFILE_PATH,
            422,
            r#"{"detail":[{"msg":"Unknown campus"}]}"#,
        );
        let client = TestClient::signed_in(backend, false).await;

        let err = client
            .profile()
            .save(&complete_profile())
            .await
            .expect_err("rejected");

        assert_eq!(err.to_string(), "Unknown campus");
        assert!(!client.auth().current_user().expect("user").profile_complete);
    }

    #[tokio::test]
    async fn test_options_and_intelligence() {
        let backend = Backend::new()
            .on(
                HttpMethod::Get,
                OPTIONS_PATH,
                200,
                r#"{"campuses":["University Park","Behrend"],"academic_levels":["Freshman"]}"#,
            )
            .on(
                HttpMethod::Get,
                INTELLIGENCE_PATH,
                200,
                r#"{"context":{"term":"Spring 2026"},"insight":"No urgent items right now.","urgency":"medium","action":{"label":"Plan ahead","prompt":"Help me plan"}}"#,
            );
        let client = TestClient::signed_in(backend, true).await;

        let options = client.profile().options().await.expect("options");
        assert_eq!(options.campuses.len(), 2);
        assert!(options.majors.is_empty());

        let insight = client.profile().intelligence().await.expect("insight");
        assert_eq!(insight.urgency, Urgency::Medium);
        assert_eq!(
            insight.action.map(|a| a.label).as_deref(),
            Some("Plan ahead")
        );
    }
}
