use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{db::OrmConn, entity::UserRoles, error::AppResult};

/// Role a user holds through their `user_roles` row. A user has at most
/// one role; users without a row are treated as having none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Manager,
    Customer,
    DeliveryCrew,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Customer => "customer",
            Role::DeliveryCrew => "delivery_crew",
        }
    }

    pub fn from_db(value: &str) -> Option<Role> {
        match value {
            "manager" => Some(Role::Manager),
            "customer" => Some(Role::Customer),
            "delivery_crew" => Some(Role::DeliveryCrew),
            _ => None,
        }
    }

    /// Group URL segment, as in `/groups/{role}/users`. Only staff roles
    /// are addressable; any other segment is Not Found.
    pub fn from_path_segment(segment: &str) -> Option<Role> {
        match segment {
            "manager" => Some(Role::Manager),
            "delivery-crew" => Some(Role::DeliveryCrew),
            _ => None,
        }
    }
}

/// Look up the caller's current role. Runs on every request so an
/// assignment change applies to the target's next request.
pub async fn resolve(orm: &OrmConn, user_id: Uuid) -> AppResult<Option<Role>> {
    let row = UserRoles::find_by_id(user_id).one(orm).await?;
    Ok(row.and_then(|r| Role::from_db(&r.role)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_strings_round_trip() {
        for role in [Role::Manager, Role::Customer, Role::DeliveryCrew] {
            assert_eq!(Role::from_db(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_db("admin"), None);
        assert_eq!(Role::from_db(""), None);
    }

    #[test]
    fn path_segments_cover_staff_roles_only() {
        assert_eq!(Role::from_path_segment("manager"), Some(Role::Manager));
        assert_eq!(
            Role::from_path_segment("delivery-crew"),
            Some(Role::DeliveryCrew)
        );
        assert_eq!(Role::from_path_segment("delivery_crew"), None);
        assert_eq!(Role::from_path_segment("customer"), None);
        assert_eq!(Role::from_path_segment("managers"), None);
    }
}
