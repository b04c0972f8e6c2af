use std::panic::RefUnwindSafe;

/// Twelve monthly mean temperatures (January first); `None` marks a missing month.
pub type MonthlyTemperatures = [Option<f64>; 12];

/// Potential evapotranspiration formula exposed to SQL as `calc_pet`.
///
/// Implementations own their null policy; the master table builder only
/// calls the SQL function and stores whatever comes back.
pub trait PetFormula: Send + Sync + RefUnwindSafe {
    fn name(&self) -> &'static str;

    fn annual_pet(&self, months: &MonthlyTemperatures) -> Option<f64>;
}

/// Unadjusted Thornthwaite (1948) PET, summed over the year in mm.
///
/// Months that are missing or not above 0 °C contribute nothing to either
/// the heat index or the sum. A year without any warm month yields `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thornthwaite;

impl Thornthwaite {
    /// Annual heat index `I = Σ (T/5)^1.514` over months with `T > 0`
    pub fn heat_index(months: &MonthlyTemperatures) -> f64 {
        warm_months(months).map(|t| (t / 5.0).powf(1.514)).sum()
    }

    /// Empirical exponent `a` for a given heat index
    pub fn exponent(heat_index: f64) -> f64 {
        let i = heat_index;
        6.75e-7 * i.powi(3) - 7.71e-5 * i.powi(2) + 1.792e-2 * i + 0.49239
    }
}

impl PetFormula for Thornthwaite {
    fn name(&self) -> &'static str {
        "thornthwaite"
    }

    fn annual_pet(&self, months: &MonthlyTemperatures) -> Option<f64> {
        let heat_index = Self::heat_index(months);
        if heat_index == 0.0 {
            return Some(0.0);
        }

        let a = Self::exponent(heat_index);
        let total = warm_months(months)
            .map(|t| 16.0 * (10.0 * t / heat_index).powf(a))
            .sum();

        Some(total)
    }
}

fn warm_months(months: &MonthlyTemperatures) -> impl Iterator<Item = f64> + '_ {
    months.iter().filter_map(|m| m.filter(|t| *t > 0.0))
}
