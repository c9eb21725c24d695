use super::store;
use crate::auth::{self, ANYONE};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::load;
use common::model::statistics::LoadSummary;
use common::model::teacher::Teacher;
use common::requests::TeacherNamesResponse;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct TeacherFilter {
    pub department_id: Option<String>,
}

#[derive(Serialize)]
pub struct TeacherListing {
    #[serde(flatten)]
    pub teacher: Teacher,
    pub load: LoadSummary,
}

pub async fn list(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    filter: web::Query<TeacherFilter>,
) -> impl Responder {
    match list_teachers(&req, &config, filter.into_inner()) {
        Ok(teachers) => HttpResponse::Ok().json(teachers),
        Err(e) => e.error_response(),
    }
}

fn list_teachers(
    req: &HttpRequest,
    config: &AppConfig,
    filter: TeacherFilter,
) -> Result<Vec<TeacherListing>, ApiError> {
    auth::authorize(req, config, ANYONE)?;
    let conn = db::open(&config.database_path)?;
    let mut teachers = store::load_teachers(&conn)?;
    load::retain_teaching_staff(&mut teachers, &config.excluded_teacher_ids);

    Ok(teachers
        .into_iter()
        .filter(|t| match &filter.department_id {
            Some(dep) => t.department_id.as_ref() == Some(dep),
            None => true,
        })
        .map(|teacher| TeacherListing {
            load: load::summarize(&teacher),
            teacher,
        })
        .collect())
}

pub async fn names(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    match teacher_names(&req, &config) {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.error_response(),
    }
}

fn teacher_names(req: &HttpRequest, config: &AppConfig) -> Result<TeacherNamesResponse, ApiError> {
    let user = auth::authorize(req, config, ANYONE)?;
    let department = auth::department_scope(&user)?;
    let conn = db::open(&config.database_path)?;
    let mut data = store::teacher_names(&conn, department)?;
    data.retain(|t| !config.excluded_teacher_ids.contains(&t.id));
    Ok(TeacherNamesResponse {
        success: true,
        data,
    })
}

pub async fn one(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    teacher_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        store::find_teacher(&conn, &teacher_id)?
            .ok_or_else(|| ApiError::NotFound(format!("giáo viên {}", teacher_id)))
    });
    match result {
        Ok(teacher) => HttpResponse::Ok().json(TeacherListing {
            load: load::summarize(&teacher),
            teacher,
        }),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, TestEnv};
    use actix_web::test;
    use common::requests::TeacherNamesResponse;

    #[actix_web::test]
    async fn listing_hides_excluded_staff_and_attaches_load() {
        let mut env = TestEnv::new();
        env.config.excluded_teacher_ids = vec!["PLACEHOLDER".to_string()];
        env.add_teacher("T1", "Nguyen Van A", None, 100);
        env.add_teacher("PLACEHOLDER", "Chưa phân công", None, 0);
        env.add_class("C1", "10A1", &[("S1", "Toán", 40)]);
        env.add_assignment("A1", "T1", "C1", "S1", 40);
        let token = env.admin();

        let app = test::init_service(env.app()).await;
        let req = test::TestRequest::get()
            .uri("/api/teachers")
            .insert_header(bearer(&token))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], "T1");
        assert_eq!(list[0]["declared_lessons"], 40);
        assert_eq!(list[0]["load"]["completion_percentage"], 40.0);
    }

    #[actix_web::test]
    async fn names_use_the_success_envelope() {
        let env = TestEnv::new();
        env.add_teacher("T1", "Nguyen Van A", None, 100);
        let token = env.admin();

        let app = test::init_service(env.app()).await;
        let req = test::TestRequest::get()
            .uri("/api/teachers/names")
            .insert_header(bearer(&token))
            .to_request();
        let body: TeacherNamesResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.success);
        assert_eq!(body.data[0].name, "Nguyen Van A");
    }

    #[actix_web::test]
    async fn unknown_teacher_is_404() {
        let env = TestEnv::new();
        let token = env.admin();
        let app = test::init_service(env.app()).await;
        let req = test::TestRequest::get()
            .uri("/api/teachers/nobody")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
