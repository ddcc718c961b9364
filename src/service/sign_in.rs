use crate::error::CoopError;
use crate::service::membership::{
    AuthenticatedIdentity, FormFields, Membership, form_to_map, required_string,
};
use crate::service::password::verify_password_blocking;
use crate::session::Session;
use crate::session::csrf::{CSRF_FORM_FIELD, verify_csrf_token};
use crate::validation::{FieldSpec, validate};
use tracing::{info, instrument, warn};

pub const SIGN_IN_FIELDS: &[FieldSpec] =
    &[FieldSpec::required("email"), FieldSpec::required("password")];

impl Membership {
    /// Check credentials. Read-only: no record is modified.
    ///
    /// Unknown email and wrong password both yield `SignInFailed` after one
    /// Argon2 verification, so neither the status nor the timing tells them
    /// apart.
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        session: &Session,
        form: FormFields,
    ) -> Result<AuthenticatedIdentity, CoopError> {
        if !verify_csrf_token(session, form.get(CSRF_FORM_FIELD).map(String::as_str)) {
            warn!("sign-in rejected: CSRF token missing or invalid");
            return Err(CoopError::CsrfRejected);
        }

        let mut fields = validate(form_to_map(&form, &[CSRF_FORM_FIELD]), SIGN_IN_FIELDS)
            .into_result()?;
        let email = required_string(&mut fields, "email")?;
        let password = form.get("password").cloned().unwrap_or_default();

        let applicant = self.applicants.find_by_email(&email).await?;
        let stored_hash = applicant.as_ref().map(|a| a.password_hash.clone());
        let verified = verify_password_blocking(password, stored_hash).await?;

        match applicant {
            Some(a) if verified => {
                info!(applicant_id = a.id, "applicant signed in");
                Ok(AuthenticatedIdentity {
                    applicant_id: a.id,
                    email: a.email,
                    first_name: a.first_name,
                })
            }
            _ => {
                info!("sign-in rejected");
                Err(CoopError::SignInFailed)
            }
        }
    }
}
