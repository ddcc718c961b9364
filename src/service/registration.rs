use crate::db::models::{Applicant, MinAge, NewApplicant};
use crate::error::CoopError;
use crate::service::captcha::RECAPTCHA_RESPONSE_FIELD;
use crate::service::membership::{FormFields, Membership, form_to_map, required_string};
use crate::service::password::hash_password_blocking;
use crate::session::Session;
use crate::session::csrf::{CSRF_FORM_FIELD, verify_csrf_token};
use crate::validation::{FieldSpec, take_string, validate};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

pub const CONFIRM_PASSWORD_FIELD: &str = "confirmPassword";
pub const VERIFIED_YEARS_FIELD: &str = "verifiedYears";

pub const REGISTRATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("firstName"),
    FieldSpec::required("lastName"),
    FieldSpec::required("email"),
    FieldSpec::optional("companyName"),
    FieldSpec::required("country"),
    FieldSpec::required("minAge"),
    FieldSpec::required("agreementRevisionDate"),
    FieldSpec::required("password"),
];

const CONTROL_FIELDS: &[&str] = &[
    CSRF_FORM_FIELD,
    CONFIRM_PASSWORD_FIELD,
    VERIFIED_YEARS_FIELD,
    RECAPTCHA_RESPONSE_FIELD,
];

impl Membership {
    /// Validate a registration form and store the applicant.
    ///
    /// Checks run in order: CSRF, CAPTCHA (when configured), password
    /// confirmation, required fields. Only then is the password hashed and
    /// the row inserted.
    #[instrument(skip_all)]
    pub async fn register(&self, session: &Session, form: FormFields) -> Result<Applicant, CoopError> {
        if !verify_csrf_token(session, form.get(CSRF_FORM_FIELD).map(String::as_str)) {
            warn!("registration rejected: CSRF token missing or invalid");
            return Err(CoopError::CsrfRejected);
        }

        if let Some(captcha) = &self.captcha {
            let token = form.get(RECAPTCHA_RESPONSE_FIELD).map(String::as_str);
            if !captcha.verify(token).await? {
                warn!("registration rejected: CAPTCHA failed");
                return Err(CoopError::CaptchaRejected);
            }
        }

        if form.get("password") != form.get(CONFIRM_PASSWORD_FIELD) {
            return Err(CoopError::PasswordMismatch);
        }
        let password = form.get("password").cloned().unwrap_or_default();

        let submission = self.registration_submission(&form);
        let mut fields = validate(submission, REGISTRATION_FIELDS).into_result()?;

        let min_age_raw = required_string(&mut fields, "minAge")?;
        let min_age = MinAge::parse(&min_age_raw).ok_or_else(|| CoopError::Validation {
            missing: vec!["minAge".to_string()],
        })?;

        let new = NewApplicant {
            first_name: required_string(&mut fields, "firstName")?,
            last_name: required_string(&mut fields, "lastName")?,
            email: required_string(&mut fields, "email")?,
            company_name: take_string(&mut fields, "companyName"),
            country: required_string(&mut fields, "country")?,
            min_age,
            agreement_revision_date: self.agreement_revision,
            // Hash what the user typed; trimming only decides presence.
            password_hash: hash_password_blocking(password).await?,
        };

        let applicant = self.applicants.create(new).await.inspect_err(|e| {
            if matches!(e, CoopError::DuplicateEmail) {
                info!("registration rejected: email already registered");
            }
        })?;
        info!(applicant_id = applicant.id, "registered applicant");
        Ok(applicant)
    }

    /// Form fields plus the server-derived `minAge` and `agreementRevisionDate`.
    fn registration_submission(&self, form: &FormFields) -> Map<String, Value> {
        let mut submission = form_to_map(form, CONTROL_FIELDS);
        let min_age = if form.contains_key(VERIFIED_YEARS_FIELD) {
            Value::String(MinAge::Eighteen.as_str().to_string())
        } else {
            Value::Null
        };
        submission.insert("minAge".to_string(), min_age);
        submission.insert(
            "agreementRevisionDate".to_string(),
            Value::String(self.agreement_revision.to_string()),
        );
        submission
    }
}
