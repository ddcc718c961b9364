pub mod bootstrap;
pub mod captcha;
pub mod membership;
pub mod password;
pub mod registration;
pub mod sign_in;
