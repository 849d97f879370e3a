//! Effectivities - conditions under which a part revision is in effect

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single effectivity condition attached to a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effectivity {
    /// In effect between two dates (inclusive); either end may be open
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<NaiveDate>,
    },

    /// In effect for a range of serial numbers of a configuration item
    Serial {
        configuration_item: String,
        start: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },

    /// In effect for a range of lots of a configuration item
    Lot {
        configuration_item: String,
        start: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

/// A configuration item and one of its units (a serial number or a lot id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUnit {
    pub configuration_item: String,
    pub value: String,
}

impl ItemUnit {
    pub fn new(configuration_item: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            configuration_item: configuration_item.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ItemUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.configuration_item, self.value)
    }
}

impl FromStr for ItemUnit {
    type Err = String;

    /// Parses `ITEM:VALUE`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((item, value)) if !item.is_empty() && !value.is_empty() => {
                Ok(Self::new(item, value))
            }
            _ => Err(format!("expected CONFIGURATION_ITEM:VALUE, got '{}'", s)),
        }
    }
}

/// What an effectivity is evaluated against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<ItemUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot: Option<ItemUnit>,
}

impl EffectivityContext {
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn for_serial(unit: ItemUnit) -> Self {
        Self {
            serial: Some(unit),
            ..Default::default()
        }
    }

    pub fn for_lot(unit: ItemUnit) -> Self {
        Self {
            lot: Some(unit),
            ..Default::default()
        }
    }
}

impl Effectivity {
    /// Whether this condition holds for the given context
    ///
    /// A condition whose dimension is absent from the context never holds.
    pub fn is_effective(&self, context: &EffectivityContext) -> bool {
        match self {
            Effectivity::Date { start, end } => context.date.is_some_and(|date| {
                start.map_or(true, |s| s <= date) && end.map_or(true, |e| date <= e)
            }),
            Effectivity::Serial {
                configuration_item,
                start,
                end,
            } => unit_in_range(context.serial.as_ref(), configuration_item, start, end.as_deref()),
            Effectivity::Lot {
                configuration_item,
                start,
                end,
            } => unit_in_range(context.lot.as_ref(), configuration_item, start, end.as_deref()),
        }
    }
}

fn unit_in_range(unit: Option<&ItemUnit>, item: &str, start: &str, end: Option<&str>) -> bool {
    let Some(unit) = unit else {
        return false;
    };
    if unit.configuration_item != item {
        return false;
    }
    compare_units(start, &unit.value) != Ordering::Greater
        && end.map_or(true, |e| compare_units(&unit.value, e) != Ordering::Greater)
}

/// Order serial numbers and lot ids, numerically when both are digit strings
pub fn compare_units(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}
