//! Static registry of the places whose reviews are synchronized.
//!
//! Callers address a place by its context key (e.g. `nema_leblon`); the
//! registry maps that key to the upstream Google Maps place identifier.

use serde::Serialize;

use crate::error::CoreError;

/// A place known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Place {
    /// Caller-facing symbolic name.
    pub context_key: &'static str,
    /// Google Maps place identifier used by the review provider.
    pub place_id: &'static str,
    /// Human-readable label for listings and logs.
    pub display_name: &'static str,
}

/// Every registered place. Lifecycle is configuration, not data.
pub const PLACES: &[Place] = &[
    Place {
        context_key: "nema_humaita",
        place_id: "ChIJizElztN_mQARyfLk7REGZRc",
        display_name: "Nema Humaitá",
    },
    Place {
        context_key: "nema_visconde_de_piraja",
        place_id: "ChIJhxTcDIrVmwARm0brYm21Hkw",
        display_name: "Nema Visconde de Pirajá",
    },
    Place {
        context_key: "nema_leblon",
        place_id: "ChIJF8dM_x_VmwARHGUmlUaKD5M",
        display_name: "Nema Leblon",
    },
];

/// Resolve a context key to its registered place.
pub fn resolve(context_key: &str) -> Result<&'static Place, CoreError> {
    let key = context_key.trim();
    PLACES
        .iter()
        .find(|p| !key.is_empty() && p.context_key == key)
        .ok_or_else(|| CoreError::UnknownContext(context_key.to_string()))
}

/// All registered places, in declaration order.
pub fn all() -> &'static [Place] {
    PLACES
}
