//! Converter widget state and its input handlers
//!
//! Each handler takes the already-read input value and returns what the
//! other field (or the unit selectors) should display; binding to an
//! actual UI happens at the boundary.

use tracing::{error, info};

use crate::rates::error::RateError;
use crate::rates::manager::RateCacheManager;
use crate::rates::store::KeyValueStore;
use crate::rates::types::RefreshOutcome;
use crate::units::converter::{convert_rates, format_value, parse_input};
use crate::units::error::ConversionError;
use crate::units::registry::UnitRegistry;
use crate::units::types::CategoryId;

pub const STATUS_UNAVAILABLE: &str = "Currency rates unavailable";

/// An entry of a unit selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOption {
    pub code: String,
    pub display_name: String,
}

pub struct ConverterWidget {
    registry: UnitRegistry,
    category: CategoryId,
    unit1: Option<String>,
    unit2: Option<String>,
    status: String,
}

impl ConverterWidget {
    pub fn new(registry: UnitRegistry) -> Self {
        let mut widget = Self {
            registry,
            category: CategoryId::Length,
            unit1: None,
            unit2: None,
            status: String::new(),
        };
        widget.select_category(CategoryId::Length);
        widget
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn category(&self) -> CategoryId {
        self.category
    }

    pub fn selected_units(&self) -> (Option<&str>, Option<&str>) {
        (self.unit1.as_deref(), self.unit2.as_deref())
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Refreshes currency rates through `manager` and loads them into the
    /// currency category.
    pub async fn load_rates<S: KeyValueStore>(&mut self, manager: &RateCacheManager<S>) {
        let result = manager.ensure_fresh_rates().await;
        self.apply_refresh(result, manager.currencies());
    }

    /// Applies the outcome of a rate refresh to the currency category and
    /// the status line.
    pub fn apply_refresh(
        &mut self,
        result: Result<RefreshOutcome, RateError>,
        currencies: &[String],
    ) {
        match result {
            Ok(outcome) => {
                self.registry
                    .set_currency_rates(&outcome.snapshot, currencies);
                self.status = outcome.status_message();
                info!("{}", self.status);
            }
            Err(e) => {
                error!("Currency rates unavailable: {}", e);
                self.status = STATUS_UNAVAILABLE.to_string();
            }
        }

        if self.category == CategoryId::Currency {
            self.select_category(CategoryId::Currency);
        }
    }

    /// Switches category and returns the options for both unit selectors.
    ///
    /// The first unit is selected on the left and the second (if any) on
    /// the right.
    pub fn select_category(&mut self, category: CategoryId) -> Vec<UnitOption> {
        self.category = category;

        let units = self.registry.category(category);
        let options: Vec<UnitOption> = units
            .iter()
            .map(|(code, unit)| UnitOption {
                code: code.to_string(),
                display_name: unit.display_name.clone(),
            })
            .collect();

        self.unit1 = options.first().map(|o| o.code.clone());
        self.unit2 = options
            .get(1)
            .or_else(|| options.first())
            .map(|o| o.code.clone());

        options
    }

    /// Changes the selected units of the current category.
    pub fn select_units(&mut self, unit1: &str, unit2: &str) -> Result<(), ConversionError> {
        let units = self.registry.category(self.category);
        for unit in [unit1, unit2] {
            if units.get(unit).is_none() {
                return Err(ConversionError::UnknownUnit {
                    category: self.category.to_string(),
                    unit: unit.to_string(),
                });
            }
        }

        self.unit1 = Some(unit1.to_string());
        self.unit2 = Some(unit2.to_string());
        Ok(())
    }

    /// Input typed into the first field; returns the second field's text.
    pub fn on_input1(&self, input: &str) -> String {
        self.convert_between(input, self.unit1.as_deref(), self.unit2.as_deref())
    }

    /// Input typed into the second field; returns the first field's text.
    pub fn on_input2(&self, input: &str) -> String {
        self.convert_between(input, self.unit2.as_deref(), self.unit1.as_deref())
    }

    fn convert_between(&self, input: &str, from: Option<&str>, to: Option<&str>) -> String {
        let units = self.registry.category(self.category);
        let (Some(from), Some(to)) = (from.and_then(|u| units.get(u)), to.and_then(|u| units.get(u)))
        else {
            return String::new();
        };

        parse_input(input)
            .map(|value| format_value(convert_rates(value, from.rate, to.rate)))
            .unwrap_or_default()
    }
}

/// Converts text input between `unit1` and `unit2` of `category`, from the
/// second unit to the first when `reverse` is set.
///
/// Non-numeric input yields an empty string, like the widget fields.
pub fn convert_input(
    registry: &UnitRegistry,
    category: &str,
    unit1: &str,
    unit2: &str,
    input: &str,
    reverse: bool,
) -> Result<String, ConversionError> {
    let (from, to) = if reverse { (unit2, unit1) } else { (unit1, unit2) };

    match parse_input(input) {
        Some(value) => Ok(format_value(registry.convert(category, from, to, value)?)),
        None => Ok(String::new()),
    }
}
