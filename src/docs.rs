use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, UserResponse, UserRole};
use crate::modules::cars::model::{Car, CreateCarDto, UpdateCarDto};
use crate::modules::classrooms::model::{Classroom, CreateClassroomDto, UpdateClassroomDto};
use crate::modules::exams::model::{
    BookExamDto, ExamDetails, ExamType, ExaminerOption, LocationOption,
};
use crate::modules::groups::model::{CreateGroupDto, Group, UpdateGroupDto};
use crate::modules::instructors::model::{CreateInstructorDto, Instructor, UpdateInstructorDto};
use crate::modules::lessons::model::{CreateLessonDto, Lesson, LessonKind, UpdateLessonDto};
use crate::modules::reference::model::{Category, ExamTypeOption, LessonTopic};
use crate::modules::reports::model::{ReportLesson, StudentReport};
use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::modules::teachers::model::{CreateTeacherDto, Teacher, UpdateTeacherDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::instructors::controller::create_instructor,
        crate::modules::instructors::controller::get_instructors,
        crate::modules::instructors::controller::get_instructor,
        crate::modules::instructors::controller::update_instructor,
        crate::modules::instructors::controller::delete_instructor,
        crate::modules::groups::controller::create_group,
        crate::modules::groups::controller::get_groups,
        crate::modules::groups::controller::get_group,
        crate::modules::groups::controller::update_group,
        crate::modules::groups::controller::delete_group,
        crate::modules::lessons::controller::create_lesson,
        crate::modules::lessons::controller::get_lessons,
        crate::modules::lessons::controller::get_lesson,
        crate::modules::lessons::controller::update_lesson,
        crate::modules::lessons::controller::delete_lesson,
        crate::modules::cars::controller::create_car,
        crate::modules::cars::controller::get_cars,
        crate::modules::cars::controller::get_car,
        crate::modules::cars::controller::update_car,
        crate::modules::cars::controller::delete_car,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::get_classrooms,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::update_classroom,
        crate::modules::classrooms::controller::delete_classroom,
        crate::modules::exams::controller::create_exam,
        crate::modules::exams::controller::get_exams,
        crate::modules::exams::controller::get_exam,
        crate::modules::exams::controller::update_exam,
        crate::modules::exams::controller::delete_exam,
        crate::modules::exams::controller::get_examiners,
        crate::modules::exams::controller::get_exam_locations,
        crate::modules::exams::controller::get_my_exams,
        crate::modules::reference::controller::get_categories,
        crate::modules::reference::controller::get_lesson_topics,
        crate::modules::reference::controller::get_exam_types,
        crate::modules::reports::controller::get_student_report,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            LoginRequest,
            LoginResponse,
            ErrorResponse,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            Instructor,
            CreateInstructorDto,
            UpdateInstructorDto,
            Group,
            CreateGroupDto,
            UpdateGroupDto,
            Lesson,
            LessonKind,
            CreateLessonDto,
            UpdateLessonDto,
            Car,
            CreateCarDto,
            UpdateCarDto,
            Classroom,
            CreateClassroomDto,
            UpdateClassroomDto,
            ExamType,
            BookExamDto,
            ExamDetails,
            ExaminerOption,
            LocationOption,
            Category,
            LessonTopic,
            ExamTypeOption,
            StudentReport,
            ReportLesson,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User authentication endpoints"),
        (name = "Students", description = "Student management endpoints"),
        (name = "Teachers", description = "Teacher management endpoints"),
        (name = "Instructors", description = "Instructor management endpoints"),
        (name = "Groups", description = "Training group management endpoints"),
        (name = "Lessons", description = "Lesson scheduling endpoints"),
        (name = "Cars", description = "Car fleet endpoints"),
        (name = "Classrooms", description = "Classroom management endpoints"),
        (name = "Exams", description = "Exam booking and conflict detection"),
        (name = "Reference", description = "Read-only lookup data"),
        (name = "Reports", description = "Student report generation")
    ),
    info(
        title = "DriveDesk API",
        version = "0.1.0",
        description = "A REST API for driving-school administration built with Rust, Axum, and PostgreSQL: students, instructors, groups, lessons, and conflict-checked exam booking.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
