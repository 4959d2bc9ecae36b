use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::menu_items::{CategoryList, CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        menu_items,
        menu_items::{
            ActiveModel as MenuItemActive, Column as MenuItemCol, Entity as MenuItems,
            Model as MenuItemModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, MenuItem},
    policy::{Action, authorize},
    response::{ApiResponse, Meta},
    routes::params::{MenuItemQuery, MenuItemSortBy, Pagination, SortOrder},
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    authorize(user.role, Action::ListCategories)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Categories::find().order_by_asc(CategoryCol::Title);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn list_menu_items(
    state: &AppState,
    user: &AuthUser,
    query: MenuItemQuery,
) -> AppResult<ApiResponse<MenuItemList>> {
    authorize(user.role, Action::ListMenuItems)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(category_id) = query.category {
        condition = condition.add(MenuItemCol::CategoryId.eq(category_id));
    }
    if let Some(featured) = query.featured {
        condition = condition.add(MenuItemCol::Featured.eq(featured));
    }

    let mut finder = MenuItems::find();

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        // The join brings in a second `title` column, so both sides are
        // qualified explicitly.
        finder = finder.join(JoinType::InnerJoin, menu_items::Relation::Categories.def());
        condition = condition.add(
            Condition::any()
                .add(Expr::col((MenuItems, MenuItemCol::Title)).ilike(pattern.clone()))
                .add(Expr::col((Categories, CategoryCol::Title)).ilike(pattern)),
        );
    }

    let mut finder = finder.filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    finder = match query.sort_by {
        Some(sort_by) => {
            let sort_col = match sort_by {
                MenuItemSortBy::Price => MenuItemCol::Price,
                MenuItemSortBy::Title => MenuItemCol::Title,
            };
            match sort_order {
                SortOrder::Asc => finder.order_by_asc(sort_col),
                SortOrder::Desc => finder.order_by_desc(sort_col),
            }
        }
        None => finder.order_by_desc(MenuItemCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Menu items",
        MenuItemList { items },
        Some(meta),
    ))
}

pub async fn get_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<MenuItem>> {
    authorize(user.role, Action::RetrieveMenuItem)?;
    let result = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(menu_item_from_entity);
    let result = match result {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Menu item", result, None))
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    authorize(user.role, Action::CreateMenuItem)?;
    validate_price(payload.price)?;
    ensure_category_exists(state, payload.category_id).await?;

    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        price: Set(payload.price),
        featured: Set(payload.featured),
        category_id: Set(payload.category_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "menu_item_create",
        "menu_items",
        serde_json::json!({ "menu_item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

/// Full replace, every field required.
pub async fn replace_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    authorize(user.role, Action::UpdateMenuItem)?;
    validate_price(payload.price)?;
    ensure_category_exists(state, payload.category_id).await?;

    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let mut active: MenuItemActive = existing.into();
    active.title = Set(payload.title);
    active.price = Set(payload.price);
    active.featured = Set(payload.featured);
    active.category_id = Set(payload.category_id);
    let item = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "menu_item_update",
        "menu_items",
        serde_json::json!({ "menu_item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    authorize(user.role, Action::UpdateMenuItem)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let mut active: MenuItemActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    let item = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "menu_item_update",
        "menu_items",
        serde_json::json!({ "menu_item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user.role, Action::DeleteMenuItem)?;
    let result = MenuItems::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "menu_item_delete",
        "menu_items",
        serde_json::json!({ "menu_item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "price must be greater than 0.".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let exists = Categories::find_by_id(id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::BadRequest("Category not found.".to_string()));
    }
    Ok(())
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        slug: model.slug,
        title: model.title,
    }
}

fn menu_item_from_entity(model: MenuItemModel) -> MenuItem {
    MenuItem {
        id: model.id,
        title: model.title,
        price: model.price,
        featured: model.featured,
        category_id: model.category_id,
    }
}
