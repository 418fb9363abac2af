mod carnet;
mod category;
mod exhibition;
mod portfolio;

pub use carnet::{Carnet, CarnetPage};
pub use category::{Category, CategoryUpdate, NewCategory};
pub use exhibition::{Exhibition, ExhibitionUpdate, NewExhibition};
pub use portfolio::{NewPortfolioItem, PortfolioItem};
