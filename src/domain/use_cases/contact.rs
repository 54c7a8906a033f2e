use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    constants::{MAX_MESSAGE_LENGTH, WEB3FORMS_ENDPOINT},
    entities::contact::{ContactForm, ContactResponse, FormProvider},
    errors::AppError,
    infrastructure::delivery::http::{DeliveryResponse, FormDelivery},
    infrastructure::limiter::quota::QuotaStore,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Validated, quota-cleared submission fields.
struct SubmissionFields<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

pub struct ContactHandler<D, Q>
where
    D: FormDelivery,
    Q: QuotaStore,
{
    delivery: D,
    quota: Q,
    web3forms_access_key: Option<String>,
}

impl<D, Q> ContactHandler<D, Q>
where
    D: FormDelivery,
    Q: QuotaStore,
{
    pub fn new(delivery: D, quota: Q, web3forms_access_key: Option<String>) -> Self {
        ContactHandler {
            delivery,
            quota,
            web3forms_access_key,
        }
    }

    /// Validates and relays one submission. Preconditions fail fast in
    /// order: required fields, email syntax, message length, quota. Only
    /// then is the provider contacted.
    pub async fn submit(
        &self,
        form: &ContactForm,
        client_key: &str,
    ) -> Result<ContactResponse, AppError> {
        let fields = validate_fields(form)?;

        if !self.quota.check_and_consume(client_key).is_allowed() {
            tracing::warn!(client_key, "contact submission quota exhausted");
            return Err(AppError::RateLimited);
        }

        let provider = match form.provider.as_deref() {
            None => FormProvider::default(),
            Some(raw) => raw.parse()?,
        };

        let data = match provider {
            FormProvider::Web3Forms => self.relay_web3forms(&fields, form).await?,
            FormProvider::Generic => self.relay_generic(&fields, form).await?,
        };

        Ok(ContactResponse {
            success: true,
            message: "Thank you! Your message has been sent successfully.".to_string(),
            data,
        })
    }

    async fn relay_web3forms(
        &self,
        fields: &SubmissionFields<'_>,
        form: &ContactForm,
    ) -> Result<serde_json::Value, AppError> {
        let access_key = self.web3forms_access_key.as_deref().ok_or_else(|| {
            AppError::configuration(
                "Web3Forms access key not configured",
                "Please set WEB3FORMS_ACCESS_KEY in your environment.",
            )
        })?;

        let captcha = form
            .h_captcha_response
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::validation(
                    "Captcha required",
                    "Please complete the captcha verification.",
                )
            })?;

        let payload = serde_json::json!({
            "access_key": access_key,
            "name": fields.name,
            "email": fields.email,
            "subject": fields.subject,
            "message": fields.message,
            "from_name": fields.name,
            "botcheck": false,
            "h-captcha-response": captcha,
        });

        let headers = HashMap::from([("Accept".to_string(), "application/json".to_string())]);
        let response = self
            .delivery
            .post_json(WEB3FORMS_ENDPOINT, headers, payload)
            .await?;

        let result = parse_body(&response);
        if !response.is_success() {
            // Relay message passes through verbatim; its raw body does not.
            let message = result
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("An error occurred while submitting your message. Please try again later.")
                .to_string();
            return Err(AppError::Upstream {
                status: response.status,
                message,
                details: None,
            });
        }

        Ok(result)
    }

    async fn relay_generic(
        &self,
        fields: &SubmissionFields<'_>,
        form: &ContactForm,
    ) -> Result<serde_json::Value, AppError> {
        let endpoint = form
            .generic_api_endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::validation(
                    "Generic API endpoint not configured",
                    "Please configure your API endpoint in user.json",
                )
            })?;

        let payload = serde_json::json!({
            "name": fields.name,
            "email": fields.email,
            "subject": fields.subject,
            "message": fields.message,
        });

        let headers = form.generic_api_headers.clone().unwrap_or_default();
        let response = self.delivery.post_json(endpoint, headers, payload).await?;

        if !response.is_success() {
            return Err(AppError::Upstream {
                status: response.status,
                message: "An error occurred while submitting your message. Please try again later."
                    .to_string(),
                details: Some(response.body),
            });
        }

        // A non-JSON or empty success body still counts as a success.
        Ok(serde_json::from_str(&response.body)
            .unwrap_or_else(|_| serde_json::json!({ "success": true })))
    }
}

fn validate_fields<'a>(form: &'a ContactForm) -> Result<SubmissionFields<'a>, AppError> {
    let missing = || {
        AppError::validation(
            "Missing required fields",
            "Please fill in all required fields.",
        )
    };
    let required = |value: &'a Option<String>| -> Result<&'a str, AppError> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(missing)
    };

    let fields = SubmissionFields {
        name: required(&form.name)?,
        email: required(&form.email)?,
        subject: required(&form.subject)?,
        message: required(&form.message)?,
    };

    if !EMAIL_RE.is_match(fields.email) {
        return Err(AppError::validation(
            "Invalid email",
            "Please provide a valid email address.",
        ));
    }

    if fields.message.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(
            "Message too long",
            "Message must be less than 5000 characters.",
        ));
    }

    Ok(fields)
}

fn parse_body(response: &DeliveryResponse) -> serde_json::Value {
    serde_json::from_str(&response.body).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONTACT_QUOTA_LIMIT, CONTACT_QUOTA_WINDOW};
    use crate::infrastructure::delivery::http::MockFormDelivery;
    use crate::infrastructure::limiter::quota::InMemoryQuota;

    fn form() -> ContactForm {
        ContactForm {
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            subject: Some("Hello".into()),
            message: Some("I enjoyed your latest post.".into()),
            ..Default::default()
        }
    }

    fn quota() -> InMemoryQuota {
        InMemoryQuota::new(CONTACT_QUOTA_WINDOW, CONTACT_QUOTA_LIMIT)
    }

    fn handler_with_key(
        delivery: MockFormDelivery,
        key: Option<&str>,
    ) -> ContactHandler<MockFormDelivery, InMemoryQuota> {
        ContactHandler::new(delivery, quota(), key.map(String::from))
    }

    #[tokio::test]
    async fn missing_field_fails_before_any_network_call() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut incomplete = form();
        incomplete.email = None;

        let err = handler.submit(&incomplete, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn blank_field_counts_as_missing() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut blank = form();
        blank.subject = Some("   ".into());

        let err = handler.submit(&blank, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn malformed_email_rejected() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut bad = form();
        bad.email = Some("not-an-email".into());

        let err = handler.submit(&bad, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { error, .. } if error == "Invalid email"));
    }

    #[tokio::test]
    async fn email_without_dot_in_domain_rejected() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut bad = form();
        bad.email = Some("ada@localhost".into());

        assert!(handler.submit(&bad, "1.2.3.4").await.is_err());
    }

    #[tokio::test]
    async fn oversized_message_rejected() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut long = form();
        long.message = Some("x".repeat(5001));

        let err = handler.submit(&long, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { error, .. } if error == "Message too long"));
    }

    #[tokio::test]
    async fn missing_captcha_is_validation_error_and_not_forwarded() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let err = handler.submit(&form(), "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { error, .. } if error == "Captcha required"));
    }

    #[tokio::test]
    async fn missing_access_key_is_configuration_error() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, None);

        let mut with_captcha = form();
        with_captcha.h_captcha_response = Some("tok".into());

        let err = handler.submit(&with_captcha, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[tokio::test]
    async fn generic_without_endpoint_fails_before_any_network_call() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut generic = form();
        generic.provider = Some("generic".into());

        let err = handler.submit(&generic, "1.2.3.4").await.unwrap_err();
        assert!(
            matches!(err, AppError::Validation { error, .. } if error == "Generic API endpoint not configured")
        );
    }

    #[tokio::test]
    async fn unknown_provider_rejected() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(0);
        let handler = handler_with_key(delivery, Some("key"));

        let mut unknown = form();
        unknown.provider = Some("smoke-signals".into());

        let err = handler.submit(&unknown, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { error, .. } if error == "Invalid provider"));
    }

    #[tokio::test]
    async fn web3forms_success_includes_relay_payload() {
        let mut delivery = MockFormDelivery::new();
        delivery
            .expect_post_json()
            .withf(|url, _headers, body| {
                url == WEB3FORMS_ENDPOINT
                    && body["botcheck"] == serde_json::json!(false)
                    && body["access_key"] == serde_json::json!("secret-key")
                    && body["h-captcha-response"] == serde_json::json!("tok")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(DeliveryResponse {
                    status: 200,
                    body: r#"{"success":true,"message":"Email sent"}"#.to_string(),
                })
            });
        let handler = handler_with_key(delivery, Some("secret-key"));

        let mut with_captcha = form();
        with_captcha.h_captcha_response = Some("tok".into());

        let response = handler.submit(&with_captcha, "1.2.3.4").await.unwrap();
        assert!(response.success);
        assert_eq!(response.data["message"], "Email sent");
    }

    #[tokio::test]
    async fn web3forms_failure_passes_relay_message_through() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(1).returning(|_, _, _| {
            Ok(DeliveryResponse {
                status: 422,
                body: r#"{"success":false,"message":"Invalid access key"}"#.to_string(),
            })
        });
        let handler = handler_with_key(delivery, Some("secret-key"));

        let mut with_captcha = form();
        with_captcha.h_captcha_response = Some("tok".into());

        let err = handler.submit(&with_captcha, "1.2.3.4").await.unwrap_err();
        match err {
            AppError::Upstream {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid access key");
                assert!(details.is_none(), "relay body must not leak");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generic_success_with_non_json_body_defaults_to_success() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(1).returning(|_, _, _| {
            Ok(DeliveryResponse {
                status: 200,
                body: "OK".to_string(),
            })
        });
        let handler = handler_with_key(delivery, None);

        let mut generic = form();
        generic.provider = Some("generic".into());
        generic.generic_api_endpoint = Some("https://example.com/hook".into());

        let response = handler.submit(&generic, "1.2.3.4").await.unwrap();
        assert_eq!(response.data, serde_json::json!({ "success": true }));
    }

    #[tokio::test]
    async fn generic_failure_captures_body_as_details() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().times(1).returning(|_, _, _| {
            Ok(DeliveryResponse {
                status: 503,
                body: "upstream on fire".to_string(),
            })
        });
        let handler = handler_with_key(delivery, None);

        let mut generic = form();
        generic.provider = Some("generic".into());
        generic.generic_api_endpoint = Some("https://example.com/hook".into());

        let err = handler.submit(&generic, "1.2.3.4").await.unwrap_err();
        match err {
            AppError::Upstream {
                status, details, ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(details.as_deref(), Some("upstream on fire"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generic_merges_caller_headers() {
        let mut delivery = MockFormDelivery::new();
        delivery
            .expect_post_json()
            .withf(|url, headers, body| {
                url == "https://example.com/hook"
                    && headers.get("Authorization").map(String::as_str) == Some("Bearer t")
                    && body["name"] == serde_json::json!("Ada Lovelace")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(DeliveryResponse {
                    status: 200,
                    body: r#"{"id":"42"}"#.to_string(),
                })
            });
        let handler = handler_with_key(delivery, None);

        let mut generic = form();
        generic.provider = Some("generic".into());
        generic.generic_api_endpoint = Some("https://example.com/hook".into());
        generic.generic_api_headers = Some(HashMap::from([(
            "Authorization".to_string(),
            "Bearer t".to_string(),
        )]));

        let response = handler.submit(&generic, "1.2.3.4").await.unwrap();
        assert_eq!(response.data["id"], "42");
    }

    #[tokio::test]
    async fn sixth_submission_from_same_key_is_rate_limited() {
        let mut delivery = MockFormDelivery::new();
        delivery.expect_post_json().returning(|_, _, _| {
            Ok(DeliveryResponse {
                status: 200,
                body: "{}".to_string(),
            })
        });
        let handler = handler_with_key(delivery, None);

        let mut generic = form();
        generic.provider = Some("generic".into());
        generic.generic_api_endpoint = Some("https://example.com/hook".into());

        for _ in 0..5 {
            handler.submit(&generic, "1.2.3.4").await.unwrap();
        }
        let err = handler.submit(&generic, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited));

        // Another client key is unaffected.
        handler.submit(&generic, "5.6.7.8").await.unwrap();
    }
}
