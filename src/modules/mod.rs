pub mod auth;
pub mod cars;
pub mod classrooms;
pub mod exams;
pub mod groups;
pub mod instructors;
pub mod lessons;
pub mod reference;
pub mod reports;
pub mod students;
pub mod teachers;
