use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderItemList, OrderList, ReplaceOrderRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    policy::{self, Action, authorize},
    response::{ApiResponse, Meta},
    roles::Role,
    routes::params::{OrderListQuery, OrderSortBy, SortOrder},
    state::AppState,
};

/// Which orders the caller may see. `None` means no role resolved, which
/// yields an empty listing rather than an unscoped one.
fn scope_condition(user: &AuthUser) -> Option<Condition> {
    match user.role {
        Some(Role::Manager) => Some(Condition::all()),
        Some(Role::Customer) => Some(Condition::all().add(OrderCol::UserId.eq(user.user_id))),
        Some(Role::DeliveryCrew) => {
            Some(Condition::all().add(OrderCol::DeliveryCrewId.eq(user.user_id)))
        }
        None => None,
    }
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    authorize(user.role, Action::ListOrders)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = match scope_condition(user) {
        Some(c) => c,
        None => {
            let meta = Meta::new(page, limit, 0);
            return Ok(ApiResponse::success(
                "Orders",
                OrderList { items: Vec::new() },
                Some(meta),
            ));
        }
    };

    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let total = Orders::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let mut finder = Orders::find().find_also_related(Users).filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match query.sort_by.unwrap_or(OrderSortBy::Date) {
        OrderSortBy::Date => OrderCol::Date,
        OrderSortBy::Total => OrderCol::Total,
    };
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(order, owner)| order_from_entity(order, owner))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(meta),
    ))
}

/// Turn the caller's cart into an order. The cart rows are locked for the
/// duration of the transaction, so a concurrent duplicate submission
/// blocks and then fails on the emptied cart.
pub async fn place_order(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Order>> {
    authorize(user.role, Action::PlaceOrder)?;

    let txn = state.orm.begin().await?;

    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if cart_rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty.".to_string()));
    }

    let total: Decimal = cart_rows.iter().map(|row| row.price).sum();

    let owner = Users::find_by_id(user.user_id).one(&txn).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        delivery_crew_id: Set(None),
        status: Set(false),
        total: Set(total),
        date: NotSet,
    }
    .insert(&txn)
    .await?;

    let line_items: Vec<OrderItemActive> = cart_rows
        .iter()
        .map(|row| OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(row.menu_item_id),
            quantity: Set(row.quantity),
            unit_price: Set(row.unit_price),
            price: Set(row.price),
        })
        .collect();
    OrderItems::insert_many(line_items).exec(&txn).await?;

    // Delete exactly the locked snapshot; a line added concurrently stays
    // in the cart for the next order.
    let cart_ids: Vec<Uuid> = cart_rows.iter().map(|row| row.id).collect();
    CartItems::delete_many()
        .filter(CartCol::Id.is_in(cart_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_place",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        order_from_entity(order, owner),
        Some(Meta::empty()),
    ))
}

/// Fetch one order's line items. The order must sit inside the caller's
/// scope, and the caller must own it.
pub async fn retrieve_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderItemList>> {
    authorize(user.role, Action::RetrieveOrder)?;

    let condition = match scope_condition(user) {
        Some(c) => c.add(OrderCol::Id.eq(id)),
        None => return Err(AppError::NotFound),
    };

    let order = Orders::find().filter(condition).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.user_id != user.user_id {
        return Err(AppError::BadRequest(
            "Order does not belong to the current user.".to_string(),
        ));
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderItemList { items },
        Some(Meta::empty()),
    ))
}

/// Full replace of the mutable fields. The owner, total, and date are
/// fixed at placement.
pub async fn replace_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ReplaceOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    authorize(user.role, Action::ReplaceOrder)?;

    if let Some(crew_id) = payload.delivery_crew_id {
        ensure_user_exists(state, crew_id).await?;
    }

    let found = Orders::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    let (order, owner) = match found {
        Some(pair) => pair,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = order.into();
    active.delivery_crew_id = Set(payload.delivery_crew_id);
    active.status = Set(payload.status);
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order, owner),
        Some(Meta::empty()),
    ))
}

/// Partial update. The submitted key set is inspected before anything is
/// applied; unknown or read-only keys are rejected, never dropped.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    body: Value,
) -> AppResult<ApiResponse<Order>> {
    authorize(user.role, Action::UpdateOrder)?;

    let changes = parse_order_changes(user.role, &body)?;

    if let Some(Some(crew_id)) = changes.delivery_crew {
        ensure_user_exists(state, crew_id).await?;
    }

    let condition = match scope_condition(user) {
        Some(c) => c.add(OrderCol::Id.eq(id)),
        None => return Err(AppError::NotFound),
    };

    let found = Orders::find()
        .find_also_related(Users)
        .filter(condition)
        .one(&state.orm)
        .await?;
    let (order, owner) = match found {
        Some(pair) => pair,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = order.into();
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(crew) = changes.delivery_crew {
        active.delivery_crew_id = Set(crew);
    }
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order, owner),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user.role, Action::DeleteOrder)?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Accepted PATCH changes. The outer Option distinguishes "not submitted"
/// from an explicit value; a submitted null crew id unassigns.
#[derive(Debug, PartialEq, Eq)]
pub struct OrderChanges {
    pub status: Option<bool>,
    pub delivery_crew: Option<Option<Uuid>>,
}

pub fn parse_order_changes(role: Option<Role>, body: &Value) -> Result<OrderChanges, AppError> {
    let object = body.as_object().ok_or_else(|| {
        AppError::BadRequest("Request body must be a JSON object.".to_string())
    })?;

    match role {
        Some(Role::DeliveryCrew) => {
            if object.len() != 1 || !object.contains_key("status") {
                return Err(AppError::BadRequest(
                    "Only status field is editable.".to_string(),
                ));
            }
        }
        Some(Role::Manager) => {
            for key in object.keys() {
                if key != "status" && key != "delivery_crew_id" {
                    return Err(AppError::BadRequest(format!(
                        "Field '{key}' is not editable."
                    )));
                }
            }
        }
        _ => {
            return Err(AppError::Forbidden(policy::denial_message(&[
                Role::Manager,
                Role::DeliveryCrew,
            ])));
        }
    }

    let status = match object.get("status") {
        Some(value) => Some(value.as_bool().ok_or_else(|| {
            AppError::BadRequest("status must be a boolean.".to_string())
        })?),
        None => None,
    };

    let delivery_crew = match object.get("delivery_crew_id") {
        Some(Value::Null) => Some(None),
        Some(value) => {
            let raw = value.as_str().ok_or_else(|| {
                AppError::BadRequest("delivery_crew_id must be a UUID.".to_string())
            })?;
            let id = Uuid::parse_str(raw).map_err(|_| {
                AppError::BadRequest("delivery_crew_id must be a UUID.".to_string())
            })?;
            Some(Some(id))
        }
        None => None,
    };

    Ok(OrderChanges {
        status,
        delivery_crew,
    })
}

async fn ensure_user_exists(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let exists = Users::find_by_id(id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::BadRequest(
            "Delivery crew user not found.".to_string(),
        ));
    }
    Ok(())
}

fn order_from_entity(model: OrderModel, owner: Option<UserModel>) -> Order {
    Order {
        id: model.id,
        user: owner.map(|u| u.username).unwrap_or_default(),
        delivery_crew_id: model.delivery_crew_id,
        status: model.status,
        total: model.total,
        date: model.date,
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        price: model.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bad_request(result: Result<OrderChanges, AppError>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn crew_may_submit_exactly_status() {
        let changes =
            parse_order_changes(Some(Role::DeliveryCrew), &json!({ "status": true })).unwrap();
        assert_eq!(changes.status, Some(true));
        assert_eq!(changes.delivery_crew, None);
    }

    #[test]
    fn crew_rejects_missing_status() {
        let msg = bad_request(parse_order_changes(Some(Role::DeliveryCrew), &json!({})));
        assert_eq!(msg, "Only status field is editable.");
    }

    #[test]
    fn crew_rejects_extra_keys_even_with_status() {
        let msg = bad_request(parse_order_changes(
            Some(Role::DeliveryCrew),
            &json!({ "status": true, "total": "99.00" }),
        ));
        assert_eq!(msg, "Only status field is editable.");
    }

    #[test]
    fn crew_rejects_crew_reassignment() {
        let msg = bad_request(parse_order_changes(
            Some(Role::DeliveryCrew),
            &json!({ "delivery_crew_id": Uuid::new_v4() }),
        ));
        assert_eq!(msg, "Only status field is editable.");
    }

    #[test]
    fn manager_may_submit_status_and_crew() {
        let crew_id = Uuid::new_v4();
        let changes = parse_order_changes(
            Some(Role::Manager),
            &json!({ "status": false, "delivery_crew_id": crew_id }),
        )
        .unwrap();
        assert_eq!(changes.status, Some(false));
        assert_eq!(changes.delivery_crew, Some(Some(crew_id)));
    }

    #[test]
    fn manager_null_crew_unassigns() {
        let changes = parse_order_changes(
            Some(Role::Manager),
            &json!({ "delivery_crew_id": null }),
        )
        .unwrap();
        assert_eq!(changes.status, None);
        assert_eq!(changes.delivery_crew, Some(None));
    }

    #[test]
    fn manager_rejects_read_only_fields() {
        for key in ["total", "user_id", "date", "id"] {
            let msg = bad_request(parse_order_changes(
                Some(Role::Manager),
                &json!({ key: "x" }),
            ));
            assert_eq!(msg, format!("Field '{key}' is not editable."));
        }
    }

    #[test]
    fn status_must_be_boolean() {
        let msg = bad_request(parse_order_changes(
            Some(Role::Manager),
            &json!({ "status": "delivered" }),
        ));
        assert_eq!(msg, "status must be a boolean.");
    }

    #[test]
    fn crew_id_must_be_a_uuid() {
        let msg = bad_request(parse_order_changes(
            Some(Role::Manager),
            &json!({ "delivery_crew_id": "not-a-uuid" }),
        ));
        assert_eq!(msg, "delivery_crew_id must be a UUID.");
    }

    #[test]
    fn body_must_be_an_object() {
        let msg = bad_request(parse_order_changes(Some(Role::Manager), &json!([1, 2])));
        assert_eq!(msg, "Request body must be a JSON object.");
    }

    #[test]
    fn other_roles_are_denied() {
        let result = parse_order_changes(Some(Role::Customer), &json!({ "status": true }));
        match result {
            Err(AppError::Forbidden(msg)) => assert_eq!(
                msg,
                "Only managers or delivery crews are allowed to do this action."
            ),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }
}
