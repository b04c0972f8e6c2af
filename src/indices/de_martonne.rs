use crate::utils::constants::DE_MARTONNE_OFFSET;

/// De Martonne aridity index `P / (T + 10)`.
///
/// `precipitation` is the annual precipitation, `temperature` the annual mean
/// temperature in °C. Returns `None` when either input is missing, and when
/// `temperature == -10.0` exactly (the denominator would be zero). Below
/// -10 °C the index is negative and is returned as-is.
pub fn de_martonne(precipitation: Option<f64>, temperature: Option<f64>) -> Option<f64> {
    let (p, t) = (precipitation?, temperature?);
    let denominator = t + DE_MARTONNE_OFFSET;
    if denominator == 0.0 {
        return None;
    }
    Some(p / denominator)
}
