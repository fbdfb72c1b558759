mod defaults;
mod io;
mod schema;
mod validate;

pub use io::load_catalog;
pub use schema::{
    Catalog, ComponentSpec, DifferentialRule, Direction, ForecastOrder, SensorRule,
};
pub use validate::CatalogError;
