//! Airports, keyed by ICAO code with an IATA code alongside.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{require_non_blank, validate_identifier, Entity};
use crate::category::Category;
use crate::error::{Error, Result};

fn icao_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{4}$").expect("static ICAO pattern"))
}

fn iata_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{3}$").expect("static IATA pattern"))
}

/// An airport, identified by its ICAO code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// Four-character ICAO code, e.g. `LPPT`.
    pub icao: String,
    /// Three-character IATA code, e.g. `LIS`.
    pub iata: String,
    /// Display name.
    #[serde(alias = "airport_name")]
    pub name: String,
}

impl Airport {
    /// Create a validated airport. Codes are upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name or malformed codes.
    pub fn new(icao: &str, iata: &str, name: impl Into<String>) -> Result<Self> {
        let airport = Self {
            icao: icao.trim().to_uppercase(),
            iata: iata.trim().to_uppercase(),
            name: name.into(),
        };
        airport.validate()?;
        Ok(airport)
    }
}

impl Entity for Airport {
    const CATEGORY: Category = Category::Airport;

    fn identifier(&self) -> &str {
        &self.icao
    }

    fn validate(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        validate_identifier("icao", &self.icao)?;
        if !icao_pattern().is_match(&self.icao) {
            return Err(Error::validation(
                "icao",
                format!("'{}' must be 4 upper-case letters or digits", self.icao),
            ));
        }
        require_non_blank("iata", &self.iata)?;
        if !iata_pattern().is_match(&self.iata) {
            return Err(Error::validation(
                "iata",
                format!("'{}' must be 3 upper-case letters or digits", self.iata),
            ));
        }
        Ok(())
    }
}
