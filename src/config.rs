use std::env;

use crate::errors::AppError;
use crate::models::ServiceCatalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Sheets,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(StorageBackend::Sqlite),
            "sheets" => Some(StorageBackend::Sheets),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Sheets => "sheets",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub sheets_api_url: String,
    pub sheet_id: String,
    pub sheets_access_token: String,
    pub sheet_tab: String,
    pub service_catalog_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let storage_backend = match var("STORAGE_BACKEND") {
            Some(raw) => StorageBackend::parse(&raw).ok_or_else(|| {
                AppError::Config(format!(
                    "STORAGE_BACKEND must be `sqlite` or `sheets`, got `{raw}`"
                ))
            })?,
            None => StorageBackend::Sqlite,
        };

        Ok(Self {
            port: var("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            storage_backend,
            database_url: var("DATABASE_URL").unwrap_or_else(|| "salon.db".to_string()),
            sheets_api_url: var("SHEETS_API_URL")
                .unwrap_or_else(|| "https://sheets.googleapis.com".to_string()),
            sheet_id: var("GOOGLE_SHEET_ID").unwrap_or_default(),
            sheets_access_token: var("SHEETS_ACCESS_TOKEN").unwrap_or_default(),
            sheet_tab: var("SHEETS_TAB").unwrap_or_else(|| "Bookings".to_string()),
            service_catalog_path: var("SERVICE_CATALOG_PATH").filter(|p| !p.trim().is_empty()),
        })
    }

    /// The configured price/duration table, or the built-in one when no
    /// catalog file is set.
    pub fn load_catalog(&self) -> Result<ServiceCatalog, AppError> {
        let Some(path) = &self.service_catalog_path else {
            return Ok(ServiceCatalog::default());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read service catalog {path}: {e}")))?;
        let catalog = ServiceCatalog::from_json(&raw)
            .map_err(|e| AppError::Config(format!("invalid service catalog {path}: {e:#}")))?;

        tracing::info!(path = %path, services = catalog.services().len(), "loaded service catalog");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.database_url, "salon.db");
        assert_eq!(config.sheet_tab, "Bookings");
        assert_eq!(config.service_catalog_path, None);
    }

    #[test]
    fn test_sheets_backend_selected() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "Sheets"),
            ("GOOGLE_SHEET_ID", "abc"),
            ("PORT", "8081"),
        ]))
        .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Sheets);
        assert_eq!(config.sheet_id, "abc");
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "mongo")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_catalog_file() {
        let path = env::temp_dir().join(format!("catalog-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"services":[{"name":"Pedicure","price":800,"durationMinutes":45}]}"#,
        )
        .unwrap();

        let config = AppConfig {
            service_catalog_path: Some(path.to_string_lossy().into_owned()),
            ..AppConfig::from_lookup(lookup(&[])).unwrap()
        };
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.lookup("Pedicure").unwrap().price, 800.0);
        assert!(catalog.lookup("Haircut").is_none());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_catalog_file_is_config_error() {
        let config = AppConfig {
            service_catalog_path: Some("/nonexistent/catalog.json".to_string()),
            ..AppConfig::from_lookup(lookup(&[])).unwrap()
        };
        assert!(matches!(config.load_catalog(), Err(AppError::Config(_))));
    }
}
