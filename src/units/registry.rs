//! Unit registry built once at startup and passed to the converter

use std::collections::HashMap;

use tracing::debug;

use crate::rates::types::RateSnapshot;
use crate::units::converter::{convert_rates, round_to_precision};
use crate::units::error::ConversionError;
use crate::units::types::{CategoryId, UnitCategory, UnitDefinition};

const LENGTH_UNITS: &[(&str, &str, f64)] = &[
    ("m", "Meter (m)", 1.0),
    ("cm", "Centimeter (cm)", 0.01),
    ("km", "Kilometer (km)", 1000.0),
    ("in", "Inch (in)", 0.0254),
    ("ft", "Foot (ft)", 0.3048),
];

const WEIGHT_UNITS: &[(&str, &str, f64)] = &[
    ("kg", "Kilogram (kg)", 1.0),
    ("g", "Gram (g)", 0.001),
    ("lb", "Pound (lb)", 0.453592),
    ("oz", "Ounce (oz)", 0.0283495),
    ("tjin", "Taiwan catty (台斤)", 0.6),
    ("tliang", "Taiwan tael (台兩)", 0.0375),
];

const VOLUME_UNITS: &[(&str, &str, f64)] = &[
    ("l", "Liter (L)", 1.0),
    ("ml", "Milliliter (mL)", 0.001),
    ("gal", "Gallon (gal)", 3.78541),
];

const AREA_UNITS: &[(&str, &str, f64)] = &[
    ("sqm", "Square meter (m²)", 1.0),
    ("ha", "Hectare (ha)", 10000.0),
    ("sqft", "Square foot (sqft)", 0.092903),
    ("ping", "Ping (坪)", 3.305785),
    ("jia", "Jia (甲)", 9699.17),
];

const SPEED_UNITS: &[(&str, &str, f64)] = &[
    ("kmh", "Kilometers per hour (km/h)", 1.0),
    ("mph", "Miles per hour (mph)", 1.60934),
];

/// Display names for the currencies the rate provider can supply
const CURRENCY_NAMES: &[(&str, &str)] = &[
    ("TWD", "New Taiwan dollar (TWD)"),
    ("USD", "US dollar (USD)"),
    ("JPY", "Japanese yen (JPY)"),
    ("EUR", "Euro (EUR)"),
    ("GBP", "Pound sterling (GBP)"),
    ("KRW", "South Korean won (KRW)"),
    ("CNY", "Chinese yuan (CNY)"),
];

/// Display name for a currency code, falling back to the code itself
pub fn currency_display_name(code: &str) -> String {
    CURRENCY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// All unit categories, keyed by category id
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    categories: HashMap<CategoryId, UnitCategory>,
}

impl UnitRegistry {
    /// Creates a registry with the built-in tables and an empty currency category
    pub fn new() -> Self {
        let categories = HashMap::from([
            (CategoryId::Length, UnitCategory::from_table(LENGTH_UNITS)),
            (CategoryId::Weight, UnitCategory::from_table(WEIGHT_UNITS)),
            (CategoryId::Volume, UnitCategory::from_table(VOLUME_UNITS)),
            (CategoryId::Area, UnitCategory::from_table(AREA_UNITS)),
            (CategoryId::Speed, UnitCategory::from_table(SPEED_UNITS)),
            (CategoryId::Currency, UnitCategory::new()),
        ]);
        Self { categories }
    }

    pub fn category(&self, id: CategoryId) -> &UnitCategory {
        // Every CategoryId is inserted in `new`
        &self.categories[&id]
    }

    /// Looks up a category by its string id
    pub fn category_by_name(&self, name: &str) -> Result<&UnitCategory, ConversionError> {
        let id = name
            .parse::<CategoryId>()
            .map_err(|_| ConversionError::UnknownCategory(name.to_string()))?;
        Ok(self.category(id))
    }

    /// Replaces the currency category with the rates in `snapshot`.
    ///
    /// Units are added in `currencies` order; codes absent from the snapshot
    /// are left out.
    pub fn set_currency_rates(&mut self, snapshot: &RateSnapshot, currencies: &[String]) {
        let mut category = UnitCategory::new();
        for code in currencies {
            if let Some(&rate) = snapshot.rates.get(code) {
                category.insert(
                    code.clone(),
                    UnitDefinition::new(currency_display_name(code), rate),
                );
            }
        }
        debug!(
            "Loaded {} currencies from rates of {}",
            category.len(),
            snapshot.as_of_date
        );
        self.categories.insert(CategoryId::Currency, category);
    }

    /// Converts `value` from `from_unit` to `to_unit` within `category`.
    ///
    /// The result is rounded to six decimal places.
    pub fn convert(
        &self,
        category: &str,
        from_unit: &str,
        to_unit: &str,
        value: f64,
    ) -> Result<f64, ConversionError> {
        let units = self.category_by_name(category)?;
        let unknown_unit = |unit: &str| ConversionError::UnknownUnit {
            category: category.to_string(),
            unit: unit.to_string(),
        };

        let from = units.get(from_unit).ok_or_else(|| unknown_unit(from_unit))?;
        let to = units.get(to_unit).ok_or_else(|| unknown_unit(to_unit))?;

        if from_unit == to_unit {
            return Ok(round_to_precision(value));
        }

        Ok(convert_rates(value, from.rate, to.rate))
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}
