//! Registration and sign-in workflows.
//!
//! Both start with a CSRF check against the caller's session and touch no
//! record before it passes. Registration is implemented in
//! `registration.rs`, sign-in in `sign_in.rs`.

use crate::db::ApplicantStorage;
use crate::error::CoopError;
use crate::service::captcha::RecaptchaVerifier;
use crate::validation::take_string;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// URL-encoded form body, field name to raw value.
pub type FormFields = HashMap<String, String>;

/// Session key the signed-in identity is stored under.
pub const AUTH_SESSION_KEY: &str = "user";

/// Who a successful sign-in authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub applicant_id: i64,
    pub email: String,
    pub first_name: String,
}

#[derive(Clone)]
pub struct Membership {
    pub(crate) applicants: ApplicantStorage,
    pub(crate) captcha: Option<RecaptchaVerifier>,
    pub(crate) agreement_revision: NaiveDate,
}

impl Membership {
    pub fn new(
        applicants: ApplicantStorage,
        captcha: Option<RecaptchaVerifier>,
        agreement_revision: NaiveDate,
    ) -> Self {
        Self {
            applicants,
            captcha,
            agreement_revision,
        }
    }

    pub fn applicants(&self) -> &ApplicantStorage {
        &self.applicants
    }

    pub fn recaptcha_site_key(&self) -> Option<&str> {
        self.captcha.as_ref().map(RecaptchaVerifier::site_key)
    }
}

/// Copy form fields into a JSON map, leaving out control fields.
pub(crate) fn form_to_map(form: &FormFields, skip: &[&str]) -> Map<String, Value> {
    form.iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Pull a validated string field; absence here means validation was bypassed.
pub(crate) fn required_string(
    fields: &mut Map<String, Value>,
    name: &'static str,
) -> Result<String, CoopError> {
    take_string(fields, name).ok_or_else(|| CoopError::Validation {
        missing: vec![name.to_string()],
    })
}
