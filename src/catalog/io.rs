use std::path::Path;

use super::{schema::Catalog, validate::CatalogError};

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path_str.clone(),
        source,
    })?;
    let catalog: Catalog = toml::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path_str,
        source,
    })?;
    catalog.validate()?;
    Ok(catalog)
}
