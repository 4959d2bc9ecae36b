use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::groups::{AssignGroupUserRequest, GroupUserList},
    entity::{
        user_roles::{ActiveModel as UserRoleActive, Entity as UserRoles},
        user_roles,
        users,
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    policy::{Action, authorize},
    response::{ApiResponse, Meta},
    roles::Role,
    routes::params::Pagination,
    state::AppState,
};

/// Resolve the `{role}` path segment. Only `manager` and `delivery-crew`
/// name addressable groups; anything else is Not Found.
fn role_from_segment(segment: &str) -> Result<Role, AppError> {
    Role::from_path_segment(segment).ok_or(AppError::NotFound)
}

pub async fn list_group_users(
    state: &AppState,
    user: &AuthUser,
    segment: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<GroupUserList>> {
    authorize(user.role, Action::ListGroupUsers)?;
    let role = role_from_segment(segment)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find()
        .join(JoinType::InnerJoin, users::Relation::UserRoles.def())
        .filter(user_roles::Column::Role.eq(role.as_str()))
        .order_by_asc(UserCol::Username);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Group users",
        GroupUserList { items },
        Some(meta),
    ))
}

/// Put the named user in the path group, replacing whatever role they
/// held before.
pub async fn assign_group_user(
    state: &AppState,
    user: &AuthUser,
    segment: &str,
    payload: AssignGroupUserRequest,
) -> AppResult<ApiResponse<User>> {
    authorize(user.role, Action::AssignGroupUser)?;
    let role = role_from_segment(segment)?;

    let target = Users::find()
        .filter(UserCol::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?;
    let target = match target {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let existing = UserRoles::find_by_id(target.id).one(&state.orm).await?;
    match existing {
        Some(row) => {
            let mut active: UserRoleActive = row.into();
            active.role = Set(role.as_str().to_string());
            active.assigned_at = Set(Utc::now().into());
            active.update(&state.orm).await?;
        }
        None => {
            UserRoleActive {
                user_id: Set(target.id),
                role: Set(role.as_str().to_string()),
                assigned_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?;
        }
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "role_assign",
        "user_roles",
        serde_json::json!({ "target_id": target.id, "role": role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User assigned to group",
        user_from_entity(target),
        Some(Meta::empty()),
    ))
}

/// Remove the user from the path group. The target must currently hold
/// that role; they fall back to `customer`.
pub async fn revoke_group_user(
    state: &AppState,
    user: &AuthUser,
    segment: &str,
    target_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user.role, Action::RevokeGroupUser)?;
    let role = role_from_segment(segment)?;

    let row = UserRoles::find_by_id(target_id).one(&state.orm).await?;
    let row = match row {
        Some(r) if r.role == role.as_str() => r,
        _ => return Err(AppError::NotFound),
    };

    let mut active: UserRoleActive = row.into();
    active.role = Set(Role::Customer.as_str().to_string());
    active.assigned_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "role_revoke",
        "user_roles",
        serde_json::json!({ "target_id": target_id, "role": role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User removed from group",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
    }
}
