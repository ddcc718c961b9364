//! Bundled pages and the immutable page set shared by all handlers.

pub mod template;

pub use template::{RenderContext, Template, escape_html};

use chrono::NaiveDate;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const REGISTER_HTML: &str = include_str!("../../templates/register.html");
const SIGN_IN_HTML: &str = include_str!("../../templates/sign_in.html");
const AGREEMENT_MD: &str = include_str!("../../templates/Coop_Membership_Agreement.md");

/// Route paths, also exposed to templates so links never drift from routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePaths {
    pub index: &'static str,
    pub sign_in: &'static str,
    pub register: &'static str,
    pub agreement: &'static str,
}

pub const PATHS: PagePaths = PagePaths {
    index: "/",
    sign_in: "/signIn",
    register: "/register",
    agreement: "/Coop_Membership_Agreement",
};

#[derive(Debug, Clone)]
pub struct Agreement {
    pub text: &'static str,
    pub revision_date: NaiveDate,
    pub revision_hash: &'static str,
}

#[derive(Debug, Clone)]
pub struct Pages {
    pub paths: PagePaths,
    pub agreement: Agreement,
    index: Template,
    register: Template,
    sign_in: Template,
}

impl Pages {
    /// Page set compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            paths: PATHS,
            agreement: Agreement {
                text: AGREEMENT_MD,
                revision_date: NaiveDate::from_ymd_opt(2017, 11, 17)
                    .expect("agreement revision date is a valid date"),
                revision_hash: "8c033fb",
            },
            index: Template::new(INDEX_HTML),
            register: Template::new(REGISTER_HTML),
            sign_in: Template::new(SIGN_IN_HTML),
        }
    }

    fn base_context(&self, csrf_token: &str) -> RenderContext {
        RenderContext::new()
            .with("csrfToken", csrf_token)
            .with("indexPath", self.paths.index)
            .with("signInPath", self.paths.sign_in)
            .with("registerPath", self.paths.register)
            .with("agreementPath", self.paths.agreement)
    }

    pub fn render_index(&self, csrf_token: &str) -> String {
        self.index.render(&self.base_context(csrf_token))
    }

    pub fn render_register(&self, csrf_token: &str, recaptcha_site_key: Option<&str>) -> String {
        let ctx = self
            .base_context(csrf_token)
            .with("agreementRevisionDate", self.agreement.revision_date.to_string())
            .with("agreementRevisionHash", self.agreement.revision_hash)
            .with_opt("recaptchaSiteKey", recaptcha_site_key);
        self.register.render(&ctx)
    }

    pub fn render_sign_in(&self, csrf_token: &str) -> String {
        self.sign_in.render(&self.base_context(csrf_token))
    }
}
