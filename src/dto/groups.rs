use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignGroupUserRequest {
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupUserList {
    pub items: Vec<User>,
}
