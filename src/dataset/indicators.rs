use std::collections::{HashMap, HashSet};

use super::registry::{AliasStatus, NameIndex};
use super::sources::{DirectionRow, ProvinceRow, Registry};
use super::types::{Direction, Indicator, IndicatorId, ProvinceId};
use crate::error::{EngineError, EngineResult};

/// Raw per-province indicator values with each indicator's direction and observed range.
///
/// Immutable after `load`. Values are stored row-major (province × indicator).
#[derive(Debug, Clone)]
pub struct IndicatorDataset {
    indicators: Vec<Indicator>,
    indicator_index: HashMap<String, usize>,
    provinces: NameIndex,
    values: Vec<f64>,
}

impl IndicatorDataset {
    /// Build the dataset from the province table, the direction source and the registry.
    ///
    /// Indicators are the ones declared in `directions`, in declaration order. Provinces
    /// follow registry order.
    pub fn load(
        rows: &[ProvinceRow],
        directions: &[DirectionRow],
        registry: &Registry,
    ) -> EngineResult<Self> {
        let indicators = declared_indicators(directions)?;
        let indicator_index: HashMap<String, usize> = indicators
            .iter()
            .enumerate()
            .map(|(i, ind)| (ind.id.clone(), i))
            .collect();

        let mut provinces = NameIndex::new(registry.provinces.clone()).map_err(|dup| {
            EngineError::data_load(format!("registry lists province '{}' more than once", dup))
        })?;
        if provinces.is_empty() {
            return Err(EngineError::data_load("registry lists no provinces"));
        }
        for (alias, canonical) in &registry.aliases {
            // Aliases targeting sectors are checked by the weight profile
            if let AliasStatus::Conflict(existing) = provinces.add_alias(alias, canonical) {
                return Err(EngineError::data_load(format!(
                    "alias '{}' for '{}' collides with province '{}'",
                    alias,
                    canonical,
                    provinces.name(existing)
                )));
            }
        }

        let width = indicators.len();
        let mut values = vec![f64::NAN; provinces.len() * width];
        let mut seen: HashSet<usize> = HashSet::with_capacity(rows.len());

        for row in rows {
            let p = provinces.resolve(&row.province).ok_or_else(|| {
                EngineError::data_load(format!(
                    "values source has a row for '{}', which is not a registered province",
                    row.province
                ))
            })?;
            if !seen.insert(p) {
                return Err(EngineError::data_load(format!(
                    "province '{}' appears in more than one values row",
                    provinces.name(p)
                )));
            }

            for (column, cell) in &row.values {
                let i = *indicator_index.get(column).ok_or_else(|| {
                    EngineError::data_load(format!(
                        "indicator '{}' has no declared direction",
                        column
                    ))
                })?;
                match cell {
                    Some(v) if v.is_finite() => values[p * width + i] = *v,
                    Some(v) => {
                        return Err(EngineError::data_load(format!(
                            "province '{}' has non-finite value {} for '{}'",
                            provinces.name(p),
                            v,
                            column
                        )))
                    }
                    None => {
                        return Err(EngineError::data_load(format!(
                            "province '{}' is missing a value for '{}'",
                            provinces.name(p),
                            column
                        )))
                    }
                }
            }

            for ind in &indicators {
                if !row.values.contains_key(&ind.id) {
                    return Err(EngineError::data_load(format!(
                        "province '{}' is missing a value for '{}'",
                        provinces.name(p),
                        ind.id
                    )));
                }
            }
        }

        if let Some(missing) = (0..provinces.len()).find(|p| !seen.contains(p)) {
            return Err(EngineError::data_load(format!(
                "registered province '{}' has no row in the values source",
                provinces.name(missing)
            )));
        }

        let mut dataset = Self {
            indicators,
            indicator_index,
            provinces,
            values,
        };
        dataset.compute_ranges()?;
        Ok(dataset)
    }

    /// Observed min/max per indicator. The span `max - min` must itself be finite.
    fn compute_ranges(&mut self) -> EngineResult<()> {
        let width = self.indicators.len();
        for (i, ind) in self.indicators.iter_mut().enumerate() {
            let column = self.values.iter().skip(i).step_by(width);
            let (min, max) = column.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
            if !(max - min).is_finite() {
                return Err(EngineError::data_load(format!(
                    "indicator '{}' spans [{}, {}], which is too wide to normalize",
                    ind.id, min, max
                )));
            }
            ind.min = min;
            ind.max = max;
        }
        Ok(())
    }

    pub fn raw_value(&self, province: ProvinceId, indicator: IndicatorId) -> f64 {
        self.values[province.0 * self.indicators.len() + indicator.0]
    }

    /// All raw values of one province, in indicator order.
    pub fn province_values(&self, province: ProvinceId) -> &[f64] {
        let width = self.indicators.len();
        &self.values[province.0 * width..(province.0 + 1) * width]
    }

    pub fn direction(&self, indicator: IndicatorId) -> Direction {
        self.indicators[indicator.0].direction
    }

    /// Observed `(min, max)` of an indicator across all provinces.
    pub fn range(&self, indicator: IndicatorId) -> (f64, f64) {
        let ind = &self.indicators[indicator.0];
        (ind.min, ind.max)
    }

    pub fn indicator(&self, indicator: IndicatorId) -> &Indicator {
        &self.indicators[indicator.0]
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn indicator_id(&self, id: &str) -> Option<IndicatorId> {
        self.indicator_index.get(id).copied().map(IndicatorId)
    }

    pub fn province_id(&self, name: &str) -> Option<ProvinceId> {
        self.provinces.resolve(name).map(ProvinceId)
    }

    pub fn province_name(&self, province: ProvinceId) -> &str {
        self.provinces.name(province.0)
    }

    pub fn province_names(&self) -> &[String] {
        self.provinces.names()
    }

    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }
}

fn declared_indicators(directions: &[DirectionRow]) -> EngineResult<Vec<Indicator>> {
    if directions.is_empty() {
        return Err(EngineError::data_load("direction source declares no indicators"));
    }

    let mut seen = HashSet::with_capacity(directions.len());
    let mut indicators = Vec::with_capacity(directions.len());
    for row in directions {
        if !seen.insert(row.indicator.as_str()) {
            return Err(EngineError::data_load(format!(
                "indicator '{}' is declared more than once",
                row.indicator
            )));
        }
        let direction = row.direction.ok_or_else(|| {
            EngineError::data_load(format!(
                "indicator '{}' has no declared direction",
                row.indicator
            ))
        })?;
        indicators.push(Indicator {
            id: row.indicator.clone(),
            label: row.label.clone(),
            direction,
            min: 0.0,
            max: 0.0,
        });
    }
    Ok(indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(province: &str, values: &[(&str, Option<f64>)]) -> ProvinceRow {
        ProvinceRow {
            province: province.to_string(),
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn dir(indicator: &str, direction: Option<Direction>) -> DirectionRow {
        DirectionRow {
            indicator: indicator.to_string(),
            direction,
            label: None,
        }
    }

    fn registry(provinces: &[&str]) -> Registry {
        Registry {
            provinces: provinces.iter().map(|s| s.to_string()).collect(),
            sectors: vec!["S".to_string()],
            aliases: BTreeMap::new(),
        }
    }

    fn sample() -> IndicatorDataset {
        IndicatorDataset::load(
            &[
                row("A", &[("x", Some(10.0)), ("y", Some(90.0))]),
                row("B", &[("x", Some(50.0)), ("y", Some(50.0))]),
                row("C", &[("x", Some(90.0)), ("y", Some(10.0))]),
            ],
            &[
                dir("x", Some(Direction::Benefit)),
                dir("y", Some(Direction::Cost)),
            ],
            &registry(&["A", "B", "C"]),
        )
        .unwrap()
    }

    #[test]
    fn test_ranges_are_observed_min_max() {
        let ds = sample();
        let x = ds.indicator_id("x").unwrap();
        let y = ds.indicator_id("y").unwrap();
        assert_eq!(ds.range(x), (10.0, 90.0));
        assert_eq!(ds.range(y), (10.0, 90.0));
        assert_eq!(ds.direction(y), Direction::Cost);
    }

    #[test]
    fn test_raw_value_lookup() {
        let ds = sample();
        let b = ds.province_id("b").unwrap();
        let x = ds.indicator_id("x").unwrap();
        assert_eq!(ds.raw_value(b, x), 50.0);
        assert_eq!(ds.province_values(b), &[50.0, 50.0]);
        assert_eq!(ds.province_name(b), "B");
    }

    #[test]
    fn test_missing_value_cell() {
        let result = IndicatorDataset::load(
            &[row("A", &[("x", None)])],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A"]),
        );
        match result {
            Err(EngineError::DataLoad(msg)) => assert!(msg.contains("missing a value for 'x'")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_value_column() {
        let result = IndicatorDataset::load(
            &[row("A", &[("x", Some(1.0))])],
            &[
                dir("x", Some(Direction::Benefit)),
                dir("y", Some(Direction::Cost)),
            ],
            &registry(&["A"]),
        );
        match result {
            Err(EngineError::DataLoad(msg)) => assert!(msg.contains("missing a value for 'y'")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_indicator_without_direction() {
        let result = IndicatorDataset::load(
            &[row("A", &[("x", Some(1.0))])],
            &[dir("x", None)],
            &registry(&["A"]),
        );
        match result {
            Err(EngineError::DataLoad(msg)) => assert!(msg.contains("no declared direction")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_value_column() {
        let result = IndicatorDataset::load(
            &[row("A", &[("x", Some(1.0)), ("z", Some(2.0))])],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A"]),
        );
        assert!(matches!(result, Err(EngineError::DataLoad(_))));
    }

    #[test]
    fn test_registered_province_without_row() {
        let result = IndicatorDataset::load(
            &[row("A", &[("x", Some(1.0))])],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A", "B"]),
        );
        match result {
            Err(EngineError::DataLoad(msg)) => assert!(msg.contains("'B'")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_unregistered_and_duplicate_rows() {
        let unknown = IndicatorDataset::load(
            &[row("Z", &[("x", Some(1.0))])],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A"]),
        );
        assert!(matches!(unknown, Err(EngineError::DataLoad(_))));

        let duplicate = IndicatorDataset::load(
            &[row("A", &[("x", Some(1.0))]), row("a", &[("x", Some(2.0))])],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A"]),
        );
        assert!(matches!(duplicate, Err(EngineError::DataLoad(_))));
    }

    #[test]
    fn test_row_matched_through_alias() {
        let mut reg = registry(&["Şanlıurfa"]);
        reg.aliases.insert("urfa".to_string(), "Şanlıurfa".to_string());
        let ds = IndicatorDataset::load(
            &[row("Urfa", &[("x", Some(1.0))])],
            &[dir("x", Some(Direction::Benefit))],
            &reg,
        )
        .unwrap();
        assert_eq!(ds.province_id("sanliurfa"), Some(ProvinceId(0)));
    }

    #[test]
    fn test_alias_colliding_with_province_rejected() {
        let mut reg = registry(&["A", "B"]);
        reg.aliases.insert("a".to_string(), "B".to_string());
        let result = IndicatorDataset::load(
            &[row("A", &[("x", Some(1.0))]), row("B", &[("x", Some(2.0))])],
            &[dir("x", Some(Direction::Benefit))],
            &reg,
        );
        match result {
            Err(EngineError::DataLoad(msg)) => assert!(msg.contains("collides with province 'A'")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_range_too_wide_rejected() {
        let result = IndicatorDataset::load(
            &[
                row("A", &[("x", Some(-1e308))]),
                row("B", &[("x", Some(1e308))]),
            ],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A", "B"]),
        );
        match result {
            Err(EngineError::DataLoad(msg)) => assert!(msg.contains("too wide")),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_value() {
        let result = IndicatorDataset::load(
            &[row("A", &[("x", Some(f64::INFINITY))])],
            &[dir("x", Some(Direction::Benefit))],
            &registry(&["A"]),
        );
        assert!(matches!(result, Err(EngineError::DataLoad(_))));
    }
}
