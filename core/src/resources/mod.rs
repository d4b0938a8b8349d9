//! Per-resource clients.
//!
//! Each client borrows a configured [`MenuHttpClient`](crate::client::MenuHttpClient)
//! and maps one family of endpoints onto typed calls. Reads and deletes go
//! straight to the transport. Creates and updates validate first, and a
//! rejected input never produces a request.

pub mod allergen;
pub mod auth;
pub mod ingredient;
pub mod menu;
pub mod menu_group;
pub mod menu_item;
pub mod restaurant;

pub use allergen::Allergens;
pub use auth::Auth;
pub use ingredient::Ingredients;
pub use menu::Menus;
pub use menu_group::MenuGroups;
pub use menu_item::MenuItems;
pub use restaurant::Restaurants;
