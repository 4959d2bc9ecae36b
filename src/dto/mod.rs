pub mod auth;
pub mod cart;
pub mod groups;
pub mod menu_items;
pub mod orders;
