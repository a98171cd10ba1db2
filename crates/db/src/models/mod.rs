pub mod grade;
pub mod guardian;
pub mod mark;
pub mod role;
pub mod session;
pub mod student;
pub mod subject;
pub mod teacher_assignment;
pub mod term;
pub mod user;
