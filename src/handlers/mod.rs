pub mod pages;
pub mod register;
pub mod sign_in;
