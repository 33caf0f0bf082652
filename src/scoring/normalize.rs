use crate::dataset::{Direction, IndicatorDataset, IndicatorId, ProvinceId};

/// Value assigned to every province for an indicator whose raw values are all equal.
///
/// Every province gets the scale midpoint, so a constant indicator never reorders
/// provinces within a sector.
pub const DEGENERATE_NORMALIZED: f64 = 50.0;

/// Upper end of the normalized scale.
pub const SCALE_MAX: f64 = 100.0;

/// Map a raw value onto `[0, 100]` given the indicator's direction and observed range.
///
/// The range must have a finite span; the dataset loader rejects ranges that do not.
pub fn normalize(raw: f64, direction: Direction, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return DEGENERATE_NORMALIZED;
    }
    // Divide before scaling so a span near f64::MAX cannot overflow
    let fraction = match direction {
        Direction::Benefit => (raw - min) / span,
        Direction::Cost => (max - raw) / span,
    };
    (fraction * SCALE_MAX).clamp(0.0, SCALE_MAX)
}

/// Normalized values for every (province, indicator) pair, row-major like the dataset.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    width: usize,
    values: Vec<f64>,
}

impl NormalizedTable {
    pub fn build(dataset: &IndicatorDataset) -> Self {
        let width = dataset.indicator_count();

        for ind in dataset.indicators().iter().filter(|ind| ind.is_constant()) {
            tracing::warn!(
                indicator = %ind.id,
                value = ind.min,
                "indicator is constant across all provinces; normalizing to {}",
                DEGENERATE_NORMALIZED
            );
        }

        let mut values = Vec::with_capacity(dataset.province_count() * width);
        for p in 0..dataset.province_count() {
            let province = ProvinceId(p);
            for i in 0..width {
                let indicator = IndicatorId(i);
                let (min, max) = dataset.range(indicator);
                values.push(normalize(
                    dataset.raw_value(province, indicator),
                    dataset.direction(indicator),
                    min,
                    max,
                ));
            }
        }

        Self { width, values }
    }

    pub fn value(&self, province: ProvinceId, indicator: IndicatorId) -> f64 {
        self.values[province.0 * self.width + indicator.0]
    }

    /// All normalized values of one province, in indicator order.
    pub fn province(&self, province: ProvinceId) -> &[f64] {
        &self.values[province.0 * self.width..(province.0 + 1) * self.width]
    }
}
