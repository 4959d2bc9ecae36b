use crate::{error::AppError, roles::Role};

/// Protected operations, one variant per route and verb. Registration and
/// token login are open and never reach this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RetrieveMe,
    ListCategories,
    ListMenuItems,
    RetrieveMenuItem,
    CreateMenuItem,
    UpdateMenuItem,
    DeleteMenuItem,
    ListGroupUsers,
    AssignGroupUser,
    RevokeGroupUser,
    ListCart,
    AddToCart,
    ClearCart,
    RemoveCartItem,
    ListOrders,
    PlaceOrder,
    RetrieveOrder,
    ReplaceOrder,
    UpdateOrder,
    DeleteOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any authenticated caller, role or not.
    Authenticated,
    /// Callers holding one of the listed roles.
    Roles(&'static [Role]),
}

const MANAGER_ONLY: Access = Access::Roles(&[Role::Manager]);
const CUSTOMER_ONLY: Access = Access::Roles(&[Role::Customer]);
const MANAGER_OR_CREW: Access = Access::Roles(&[Role::Manager, Role::DeliveryCrew]);

pub fn required_access(action: Action) -> Access {
    match action {
        Action::RetrieveMe => Access::Authenticated,
        Action::ListCategories => Access::Authenticated,
        Action::ListMenuItems => Access::Authenticated,
        Action::RetrieveMenuItem => Access::Authenticated,
        Action::CreateMenuItem => MANAGER_ONLY,
        Action::UpdateMenuItem => MANAGER_ONLY,
        Action::DeleteMenuItem => MANAGER_ONLY,
        Action::ListGroupUsers => MANAGER_ONLY,
        Action::AssignGroupUser => MANAGER_ONLY,
        Action::RevokeGroupUser => MANAGER_ONLY,
        Action::ListCart => CUSTOMER_ONLY,
        Action::AddToCart => CUSTOMER_ONLY,
        Action::ClearCart => CUSTOMER_ONLY,
        Action::RemoveCartItem => CUSTOMER_ONLY,
        // Listing is open to every authenticated user; the result set is
        // scoped by role afterwards.
        Action::ListOrders => Access::Authenticated,
        Action::PlaceOrder => CUSTOMER_ONLY,
        Action::RetrieveOrder => CUSTOMER_ONLY,
        Action::ReplaceOrder => MANAGER_ONLY,
        Action::UpdateOrder => MANAGER_OR_CREW,
        Action::DeleteOrder => MANAGER_ONLY,
    }
}

/// Single policy evaluation per request. The caller is already
/// authenticated; this decides role access only.
pub fn authorize(role: Option<Role>, action: Action) -> Result<(), AppError> {
    match required_access(action) {
        Access::Authenticated => Ok(()),
        Access::Roles(allowed) => match role {
            Some(r) if allowed.contains(&r) => Ok(()),
            _ => Err(AppError::Forbidden(denial_message(allowed))),
        },
    }
}

fn role_plural(role: Role) -> &'static str {
    match role {
        Role::Manager => "managers",
        Role::Customer => "customers",
        Role::DeliveryCrew => "delivery crews",
    }
}

pub fn denial_message(allowed: &[Role]) -> String {
    let names: Vec<&str> = allowed.iter().copied().map(role_plural).collect();
    format!("Only {} are allowed to do this action.", names.join(" or "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denied(role: Option<Role>, action: Action) -> Option<String> {
        match authorize(role, action) {
            Ok(()) => None,
            Err(AppError::Forbidden(msg)) => Some(msg),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn menu_mutations_are_manager_only() {
        for action in [
            Action::CreateMenuItem,
            Action::UpdateMenuItem,
            Action::DeleteMenuItem,
        ] {
            assert!(authorize(Some(Role::Manager), action).is_ok());
            assert_eq!(
                denied(Some(Role::Customer), action).as_deref(),
                Some("Only managers are allowed to do this action.")
            );
            assert_eq!(
                denied(Some(Role::DeliveryCrew), action).as_deref(),
                Some("Only managers are allowed to do this action.")
            );
            assert!(denied(None, action).is_some());
        }
    }

    #[test]
    fn menu_reads_allow_any_authenticated_caller() {
        for role in [
            None,
            Some(Role::Manager),
            Some(Role::Customer),
            Some(Role::DeliveryCrew),
        ] {
            assert!(authorize(role, Action::ListMenuItems).is_ok());
            assert!(authorize(role, Action::RetrieveMenuItem).is_ok());
            assert!(authorize(role, Action::ListCategories).is_ok());
        }
    }

    #[test]
    fn cart_and_placement_are_customer_only() {
        for action in [
            Action::ListCart,
            Action::AddToCart,
            Action::ClearCart,
            Action::RemoveCartItem,
            Action::PlaceOrder,
            Action::RetrieveOrder,
        ] {
            assert!(authorize(Some(Role::Customer), action).is_ok());
            assert_eq!(
                denied(Some(Role::Manager), action).as_deref(),
                Some("Only customers are allowed to do this action.")
            );
            assert_eq!(
                denied(Some(Role::DeliveryCrew), action).as_deref(),
                Some("Only customers are allowed to do this action.")
            );
        }
    }

    #[test]
    fn order_patch_allows_manager_and_crew() {
        assert!(authorize(Some(Role::Manager), Action::UpdateOrder).is_ok());
        assert!(authorize(Some(Role::DeliveryCrew), Action::UpdateOrder).is_ok());
        assert_eq!(
            denied(Some(Role::Customer), Action::UpdateOrder).as_deref(),
            Some("Only managers or delivery crews are allowed to do this action.")
        );
    }

    #[test]
    fn group_administration_is_manager_only() {
        for action in [
            Action::ListGroupUsers,
            Action::AssignGroupUser,
            Action::RevokeGroupUser,
        ] {
            assert!(authorize(Some(Role::Manager), action).is_ok());
            assert!(denied(Some(Role::Customer), action).is_some());
            assert!(denied(Some(Role::DeliveryCrew), action).is_some());
        }
    }

    #[test]
    fn order_listing_is_open_to_roleless_callers() {
        assert!(authorize(None, Action::ListOrders).is_ok());
    }
}
