//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod assessment_type_repo;
pub mod component_repo;
pub mod grade_repo;
pub mod guardian_repo;
pub mod mark_repo;
pub mod role_repo;
pub mod session_repo;
pub mod stream_repo;
pub mod student_repo;
pub mod subject_repo;
pub mod teacher_assignment_repo;
pub mod term_repo;
pub mod user_repo;

pub use assessment_type_repo::AssessmentTypeRepo;
pub use component_repo::ComponentRepo;
pub use grade_repo::GradeRepo;
pub use guardian_repo::GuardianRepo;
pub use mark_repo::MarkRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use stream_repo::StreamRepo;
pub use student_repo::StudentRepo;
pub use subject_repo::SubjectRepo;
pub use teacher_assignment_repo::TeacherAssignmentRepo;
pub use term_repo::TermRepo;
pub use user_repo::UserRepo;
