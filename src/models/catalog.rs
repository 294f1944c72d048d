use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
}

/// Price and duration table consulted when a booking is created. Built once
/// at startup and shared read-only; existing bookings keep the values they
/// were stamped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    services: Vec<ServiceOffering>,
}

impl ServiceCatalog {
    pub fn new(services: Vec<ServiceOffering>) -> anyhow::Result<Self> {
        let catalog = Self { services };
        catalog.check()?;
        Ok(catalog)
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let catalog: ServiceCatalog = serde_json::from_str(s)?;
        catalog.check()?;
        Ok(catalog)
    }

    pub fn lookup(&self, name: &str) -> Option<&ServiceOffering> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn services(&self) -> &[ServiceOffering] {
        &self.services
    }

    fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.services.is_empty(), "service catalog is empty");

        let mut seen = HashSet::new();
        for offering in &self.services {
            anyhow::ensure!(!offering.name.trim().is_empty(), "service name must not be empty");
            anyhow::ensure!(
                seen.insert(offering.name.as_str()),
                "duplicate service: {}",
                offering.name
            );
            anyhow::ensure!(
                offering.price.is_finite() && offering.price >= 0.0,
                "invalid price for {}: {}",
                offering.name,
                offering.price
            );
            anyhow::ensure!(
                (15..=240).contains(&offering.duration_minutes),
                "duration for {} must be 15-240 minutes, got {}",
                offering.name,
                offering.duration_minutes
            );
        }
        Ok(())
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        let offering = |name: &str, price: f64, duration_minutes: u32| ServiceOffering {
            name: name.to_string(),
            price,
            duration_minutes,
        };

        Self {
            services: vec![
                offering("Haircut", 500.0, 30),
                offering("Haircut + Styling", 700.0, 45),
                offering("Hair Spa", 1200.0, 60),
                offering("Beard Trim", 300.0, 20),
                offering("Hair Coloring (Basic)", 2000.0, 90),
                offering("Facial", 1500.0, 60),
            ],
        }
    }
}
