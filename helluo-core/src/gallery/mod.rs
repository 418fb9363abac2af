//! Portfolio, categories and exhibitions collections.

mod categories;
mod exhibitions;
mod portfolio;
mod validation;

pub use categories::CategoryService;
pub use exhibitions::ExhibitionService;
pub use portfolio::{PortfolioSelector, PortfolioService};
