//! Common types for unit tables

use indexmap::IndexMap;

/// Measurement category a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryId {
    Length,
    Weight,
    Volume,
    Area,
    Speed,
    /// Populated at runtime from the rate snapshot
    Currency,
}

impl CategoryId {
    /// All categories in selector order
    pub const ALL: [CategoryId; 6] = [
        CategoryId::Length,
        CategoryId::Weight,
        CategoryId::Volume,
        CategoryId::Area,
        CategoryId::Speed,
        CategoryId::Currency,
    ];

    /// Returns the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Length => "length",
            CategoryId::Weight => "weight",
            CategoryId::Volume => "volume",
            CategoryId::Area => "area",
            CategoryId::Speed => "speed",
            CategoryId::Currency => "currency",
        }
    }
}

impl std::str::FromStr for CategoryId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "length" => Ok(CategoryId::Length),
            "weight" => Ok(CategoryId::Weight),
            "volume" => Ok(CategoryId::Volume),
            "area" => Ok(CategoryId::Area),
            "speed" => Ok(CategoryId::Speed),
            "currency" => Ok(CategoryId::Currency),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unit and its factor to the category base unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    pub display_name: String,
    /// Multiplying a value in this unit by `rate` gives the base unit value
    pub rate: f64,
}

impl UnitDefinition {
    pub fn new(display_name: impl Into<String>, rate: f64) -> Self {
        Self {
            display_name: display_name.into(),
            rate,
        }
    }
}

/// Units of one category keyed by unit code, in display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitCategory {
    units: IndexMap<String, UnitDefinition>,
}

impl UnitCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a category from `(code, display name, rate)` rows
    pub fn from_table(rows: &[(&str, &str, f64)]) -> Self {
        let units = rows
            .iter()
            .map(|(code, name, rate)| (code.to_string(), UnitDefinition::new(*name, *rate)))
            .collect();
        Self { units }
    }

    pub fn insert(&mut self, code: impl Into<String>, unit: UnitDefinition) {
        self.units.insert(code.into(), unit);
    }

    pub fn get(&self, code: &str) -> Option<&UnitDefinition> {
        self.units.get(code)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit codes in display order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnitDefinition)> {
        self.units.iter().map(|(code, unit)| (code.as_str(), unit))
    }

    /// Returns the code of the unit whose rate is exactly 1
    pub fn base_unit(&self) -> Option<&str> {
        self.iter()
            .find(|(_, unit)| unit.rate == 1.0)
            .map(|(code, _)| code)
    }
}
