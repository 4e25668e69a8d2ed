pub mod announcement;
pub mod faq;
pub mod outcome;
pub mod student;
pub mod user;
