pub mod carnets;
pub mod categories;
pub mod exhibitions;
pub mod health;
pub mod portfolio;
pub mod upload;
