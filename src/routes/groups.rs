use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::groups::{AssignGroupUserRequest, GroupUserList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::Pagination,
    services::group_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{role}/users",
            get(list_group_users).post(assign_group_user),
        )
        .route("/{role}/users/{user_id}", delete(revoke_group_user))
}

#[utoipa::path(
    get,
    path = "/api/groups/{role}/users",
    params(
        ("role" = String, Path, description = "Group name: manager or delivery-crew"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List group members", body = ApiResponse<GroupUserList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown group")
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn list_group_users(
    State(state): State<AppState>,
    user: AuthUser,
    Path(role): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<GroupUserList>>> {
    let resp = group_service::list_group_users(&state, &user, &role, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/groups/{role}/users",
    params(
        ("role" = String, Path, description = "Group name: manager or delivery-crew")
    ),
    request_body = AssignGroupUserRequest,
    responses(
        (status = 201, description = "Assign user to group", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown group or username")
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn assign_group_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(role): Path<String>,
    Json(payload): Json<AssignGroupUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = group_service::assign_group_user(&state, &user, &role, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{role}/users/{user_id}",
    params(
        ("role" = String, Path, description = "Group name: manager or delivery-crew"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Remove user from group"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not in this group")
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn revoke_group_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path((role, user_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = group_service::revoke_group_user(&state, &user, &role, user_id).await?;
    Ok(Json(resp))
}
