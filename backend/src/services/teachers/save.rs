use super::store;
use crate::auth::{self, MANAGERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::teacher::SaveTeacher;
use log::info;

fn validate(payload: &SaveTeacher) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Tên giáo viên không được để trống".to_string()));
    }
    Ok(())
}

fn save_teacher(
    req: &HttpRequest,
    config: &AppConfig,
    mut payload: SaveTeacher,
    existing_id: Option<String>,
) -> Result<String, ApiError> {
    let user = auth::authorize(req, config, MANAGERS)?;
    validate(&payload)?;
    let mut conn = db::open(&config.database_path)?;

    if let Some(id) = existing_id {
        if !store::teacher_exists(&conn, &id)? {
            return Err(ApiError::NotFound(format!("giáo viên {}", id)));
        }
        payload.id = Some(id);
    }
    let id = store::save_teacher(&mut conn, &payload)?;
    info!("{} saved teacher {}", user.email, id);
    Ok(id)
}

pub async fn create(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<SaveTeacher>,
) -> impl Responder {
    match save_teacher(&req, &config, payload.into_inner(), None) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn update(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    teacher_id: web::Path<String>,
    payload: web::Json<SaveTeacher>,
) -> impl Responder {
    match save_teacher(&req, &config, payload.into_inner(), Some(teacher_id.into_inner())) {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn remove(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    teacher_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, MANAGERS).and_then(|user| {
        let conn = db::open(&config.database_path)?;
        if !store::delete_teacher(&conn, &teacher_id)? {
            return Err(ApiError::NotFound(format!("giáo viên {}", teacher_id)));
        }
        info!("{} deleted teacher {}", user.email, teacher_id);
        Ok(())
    });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, TestEnv};
    use actix_web::test;
    use common::model::user::Role;

    #[actix_web::test]
    async fn teachers_cannot_edit_teachers() {
        let env = TestEnv::new();
        env.add_user("gv", "gv@thpt.edu.vn", Role::Teacher, None);
        let app = test::init_service(env.app()).await;
        let req = test::TestRequest::post()
            .uri("/api/teachers")
            .insert_header(bearer("gv"))
            .set_json(serde_json::json!({
                "name": "Nguyen Van B",
                "department_id": null,
                "basic_teaching_lessons": 340
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn create_then_delete() {
        let env = TestEnv::new();
        let token = env.admin();
        let app = test::init_service(env.app()).await;

        let req = test::TestRequest::post()
            .uri("/api/teachers")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({
                "name": "Nguyen Van B",
                "department_id": null,
                "basic_teaching_lessons": 340,
                "reductions": [{"reason": "Tổ trưởng", "reduced_lessons": 51}]
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = body["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/teachers/{}", id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/teachers/{}", id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
