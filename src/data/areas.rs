//! Geographical areas selectable on the dashboard.

use super::DataError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Label of the national aggregate.
pub const ITALY: &str = "Italia";

/// Italian regions and autonomous provinces as published by the datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Abruzzo,
    Basilicata,
    Calabria,
    Campania,
    EmiliaRomagna,
    FriuliVeneziaGiulia,
    Lazio,
    Liguria,
    Lombardia,
    Marche,
    Molise,
    Bolzano,
    Trento,
    Piemonte,
    Puglia,
    Sardegna,
    Sicilia,
    Toscana,
    Umbria,
    ValleDAosta,
    Veneto,
}

impl Region {
    pub const ALL: [Region; 21] = [
        Region::Abruzzo,
        Region::Basilicata,
        Region::Calabria,
        Region::Campania,
        Region::EmiliaRomagna,
        Region::FriuliVeneziaGiulia,
        Region::Lazio,
        Region::Liguria,
        Region::Lombardia,
        Region::Marche,
        Region::Molise,
        Region::Bolzano,
        Region::Trento,
        Region::Piemonte,
        Region::Puglia,
        Region::Sardegna,
        Region::Sicilia,
        Region::Toscana,
        Region::Umbria,
        Region::ValleDAosta,
        Region::Veneto,
    ];

    /// `denominazione_regione` in the contagion files
    pub fn name(&self) -> &'static str {
        match self {
            Region::Abruzzo => "Abruzzo",
            Region::Basilicata => "Basilicata",
            Region::Calabria => "Calabria",
            Region::Campania => "Campania",
            Region::EmiliaRomagna => "Emilia-Romagna",
            Region::FriuliVeneziaGiulia => "Friuli Venezia Giulia",
            Region::Lazio => "Lazio",
            Region::Liguria => "Liguria",
            Region::Lombardia => "Lombardia",
            Region::Marche => "Marche",
            Region::Molise => "Molise",
            Region::Bolzano => "P.A. Bolzano",
            Region::Trento => "P.A. Trento",
            Region::Piemonte => "Piemonte",
            Region::Puglia => "Puglia",
            Region::Sardegna => "Sardegna",
            Region::Sicilia => "Sicilia",
            Region::Toscana => "Toscana",
            Region::Umbria => "Umbria",
            Region::ValleDAosta => "Valle d'Aosta",
            Region::Veneto => "Veneto",
        }
    }

    /// `area` code in the vaccination files
    pub fn code(&self) -> &'static str {
        match self {
            Region::Abruzzo => "ABR",
            Region::Basilicata => "BAS",
            Region::Calabria => "CAL",
            Region::Campania => "CAM",
            Region::EmiliaRomagna => "EMR",
            Region::FriuliVeneziaGiulia => "FVG",
            Region::Lazio => "LAZ",
            Region::Liguria => "LIG",
            Region::Lombardia => "LOM",
            Region::Marche => "MAR",
            Region::Molise => "MOL",
            Region::Bolzano => "PAB",
            Region::Trento => "PAT",
            Region::Piemonte => "PIE",
            Region::Puglia => "PUG",
            Region::Sardegna => "SAR",
            Region::Sicilia => "SIC",
            Region::Toscana => "TOS",
            Region::Umbria => "UMB",
            Region::ValleDAosta => "VDA",
            Region::Veneto => "VEN",
        }
    }

    pub fn from_name(name: &str) -> Option<Region> {
        Region::ALL
            .iter()
            .find(|r| r.name() == name)
            .or_else(|| {
                Region::ALL
                    .iter()
                    .find(|r| r.name().eq_ignore_ascii_case(name))
            })
            .copied()
    }

}

/// Geographical scope of the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Area {
    #[default]
    Italy,
    Region(Region),
}

impl Area {
    /// Parse a label shown in the area selector.
    pub fn parse(label: &str) -> Result<Area, DataError> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(ITALY) {
            return Ok(Area::Italy);
        }
        Region::from_name(label)
            .map(Area::Region)
            .ok_or_else(|| DataError::UnknownArea(label.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Area::Italy => ITALY,
            Area::Region(region) => region.name(),
        }
    }

    pub fn region(&self) -> Option<Region> {
        match self {
            Area::Italy => None,
            Area::Region(region) => Some(*region),
        }
    }

    /// Selector options: region names in alphabetical order, then "Italia".
    pub fn options() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Region::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.push(ITALY);
        names
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Area {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Area {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Area::parse(&label).map_err(serde::de::Error::custom)
    }
}
