use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

/// Manager PUT body. The owning user, total, and date are fixed at
/// placement and have no writable counterpart here.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceOrderRequest {
    pub delivery_crew_id: Option<Uuid>,
    pub status: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemList {
    pub items: Vec<OrderItem>,
}
