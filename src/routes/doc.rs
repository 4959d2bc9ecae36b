use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartList},
        groups::{AssignGroupUserRequest, GroupUserList},
        menu_items::{CategoryList, CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
        orders::{OrderItemList, OrderList, ReplaceOrderRequest},
    },
    models::{CartItem, Category, MenuItem, Order, OrderItem, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, groups, health, menu_items, orders, params, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::me,
        auth::login,
        categories::list_categories,
        menu_items::list_menu_items,
        menu_items::create_menu_item,
        menu_items::get_menu_item,
        menu_items::replace_menu_item,
        menu_items::update_menu_item,
        menu_items::delete_menu_item,
        groups::list_group_users,
        groups::assign_group_user,
        groups::revoke_group_user,
        cart::cart_list,
        cart::add_to_cart,
        cart::clear_cart,
        cart::remove_from_cart,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::replace_order,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            User,
            Category,
            MenuItem,
            CartItem,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AssignGroupUserRequest,
            GroupUserList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            CategoryList,
            AddToCartRequest,
            CartList,
            ReplaceOrderRequest,
            OrderList,
            OrderItemList,
            health::HealthData,
            params::Pagination,
            params::SortOrder,
            params::MenuItemSortBy,
            params::MenuItemQuery,
            params::OrderSortBy,
            params::OrderListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<MenuItem>,
            ApiResponse<MenuItemList>,
            ApiResponse<GroupUserList>,
            ApiResponse<CartItem>,
            ApiResponse<CartList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<OrderItemList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Registration and current user"),
        (name = "Auth", description = "Token endpoints"),
        (name = "Categories", description = "Menu category endpoints"),
        (name = "Menu Items", description = "Menu item endpoints"),
        (name = "Groups", description = "Role assignment endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
