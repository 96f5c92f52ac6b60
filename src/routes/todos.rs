use crate::{
    auth::{AuthenticatedUser, AuthorizedOwner},
    error::AppError,
    models::{NewTodoRequest, UpdateTodoRequest},
    todos::TodoService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists the todos of `{userid}`. Mounted under `/todos`, as is `clear_todos`;
/// the other handlers here live under `/todo`.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Todo`, empty when there are none.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found` / `403 Forbidden`: `{userid}` is not the caller (per `OWNERSHIP_MISMATCH`).
#[get("/{userid}")]
pub async fn list_todos(
    owner: AuthorizedOwner,
    todos: web::Data<TodoService>,
) -> Result<impl Responder, AppError> {
    let list = todos.list(owner.as_str()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Deletes every todo of `{userid}`. Succeeds with a count of zero when there
/// was nothing to delete, so it is safe to retry.
#[delete("/{userid}")]
pub async fn clear_todos(
    owner: AuthorizedOwner,
    todos: web::Data<TodoService>,
) -> Result<impl Responder, AppError> {
    let deleted = todos.clear_all(owner.as_str()).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted_count": deleted })))
}

/// Fetches a single todo by id.
///
/// A todo owned by another user is reported as `404 Not Found`, the same as a
/// missing one.
#[get("/{id}")]
pub async fn get_todo(
    user: AuthenticatedUser,
    todo_id: web::Path<i64>,
    todos: web::Data<TodoService>,
) -> Result<impl Responder, AppError> {
    let todo = todos.get(user.username(), todo_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Creates a todo owned by `{userid}`.
///
/// ## Request Body:
/// - `content`: 1 to 500 characters (required).
/// - `completed` (optional): defaults to `false`.
#[post("/{userid}")]
pub async fn add_todo(
    owner: AuthorizedOwner,
    todos: web::Data<TodoService>,
    input: web::Json<NewTodoRequest>,
) -> Result<impl Responder, AppError> {
    let todo = todos.add(owner.as_str(), input.into_inner()).await?;
    Ok(HttpResponse::Created().json(todo))
}

/// Replaces content and completion of a todo the caller owns.
///
/// ## Request Body:
/// `{"id", "content", "completed"}`. Any owner field in the body is ignored.
#[put("")]
pub async fn update_todo(
    user: AuthenticatedUser,
    todos: web::Data<TodoService>,
    input: web::Json<UpdateTodoRequest>,
) -> Result<impl Responder, AppError> {
    let todo = todos.update(user.username(), input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Deletes one todo of `{userid}`.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such todo for this owner.
#[delete("/{userid}/{id}")]
pub async fn delete_todo(
    owner: AuthorizedOwner,
    path: web::Path<(String, i64)>,
    todos: web::Data<TodoService>,
) -> Result<impl Responder, AppError> {
    let (_, todo_id) = path.into_inner();
    todos.delete(owner.as_str(), todo_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
