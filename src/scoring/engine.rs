use serde::Serialize;
use std::time::Instant;

use super::attribution::{attribute, Attribution};
use super::config::EnginePolicy;
use super::normalize::{NormalizedTable, SCALE_MAX};
use super::ranking::{rank, top_n, Ranked};
use super::validation::{validate_policy, validate_profile};
use crate::dataset::{IndicatorDataset, ProvinceId, SectorId, SectorWeightProfile, Sources};
use crate::error::{EngineError, EngineResult};

/// Weight-normalized mean of normalized values, clamped to `[0, 100]`.
///
/// Callers guarantee a positive weight sum.
pub fn weighted_score(weights: &[f64], normalized: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    let weighted: f64 = weights.iter().zip(normalized).map(|(w, n)| w * n).sum();
    (weighted / total).clamp(0.0, SCALE_MAX)
}

/// Dense province × sector score table, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    sectors: usize,
    scores: Vec<f64>,
}

impl ScoreMatrix {
    /// Compute every (province, sector) score.
    ///
    /// Fails with a configuration error, naming every offending sector, if any sector's
    /// weights sum to zero.
    pub fn build(
        normalized: &NormalizedTable,
        profile: &SectorWeightProfile,
        provinces: usize,
    ) -> EngineResult<Self> {
        validate_profile(profile).map_err(|errors| EngineError::configuration(errors.join("; ")))?;

        let sectors = profile.sector_count();
        let mut scores = Vec::with_capacity(provinces * sectors);
        for p in 0..provinces {
            let values = normalized.province(ProvinceId(p));
            for s in 0..sectors {
                scores.push(weighted_score(profile.weights(SectorId(s)), values));
            }
        }
        Ok(Self { sectors, scores })
    }

    pub fn score(&self, province: ProvinceId, sector: SectorId) -> f64 {
        self.scores[province.0 * self.sectors + sector.0]
    }

    /// Scores of one province for every sector, in sector order.
    pub fn province_row(&self, province: ProvinceId) -> &[f64] {
        &self.scores[province.0 * self.sectors..(province.0 + 1) * self.sectors]
    }

    /// Scores of every province for one sector, in province order.
    pub fn sector_column(&self, sector: SectorId) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().skip(sector.0).step_by(self.sectors).copied()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Sizes of a loaded engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shapes {
    pub provinces: usize,
    pub indicators: usize,
    pub sectors: usize,
    pub weight_rows: usize,
    pub cells: usize,
}

/// The loaded dataset, weights and precomputed score matrix.
///
/// Immutable once built; share it behind an `Arc` for concurrent queries.
#[derive(Debug, Clone)]
pub struct Engine {
    dataset: IndicatorDataset,
    profile: SectorWeightProfile,
    normalized: NormalizedTable,
    matrix: ScoreMatrix,
    policy: EnginePolicy,
}

impl Engine {
    /// Load sources, normalize and compute the full score matrix.
    pub fn build(sources: &Sources, policy: EnginePolicy) -> EngineResult<Self> {
        let started = Instant::now();
        validate_policy(&policy).map_err(|errors| EngineError::configuration(errors.join("; ")))?;

        let dataset =
            IndicatorDataset::load(&sources.values, &sources.directions, &sources.registry)?;
        let profile = SectorWeightProfile::load(
            &sources.weights,
            &dataset,
            &sources.registry,
            policy.missing_weight,
        )?;
        let normalized = NormalizedTable::build(&dataset);
        let matrix = ScoreMatrix::build(&normalized, &profile, dataset.province_count())?;

        let engine = Self {
            dataset,
            profile,
            normalized,
            matrix,
            policy,
        };
        let shapes = engine.shapes();
        tracing::info!(
            provinces = shapes.provinces,
            indicators = shapes.indicators,
            sectors = shapes.sectors,
            weight_rows = shapes.weight_rows,
            cells = shapes.cells,
            elapsed = %humantime::format_duration(started.elapsed()),
            "score matrix built"
        );
        Ok(engine)
    }

    pub fn dataset(&self) -> &IndicatorDataset {
        &self.dataset
    }

    pub fn profile(&self) -> &SectorWeightProfile {
        &self.profile
    }

    pub fn normalized(&self) -> &NormalizedTable {
        &self.normalized
    }

    pub fn matrix(&self) -> &ScoreMatrix {
        &self.matrix
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    pub fn shapes(&self) -> Shapes {
        Shapes {
            provinces: self.dataset.province_count(),
            indicators: self.dataset.indicator_count(),
            sectors: self.profile.sector_count(),
            weight_rows: self.profile.row_count(),
            cells: self.matrix.len(),
        }
    }

    pub fn resolve_province(&self, name: &str) -> EngineResult<ProvinceId> {
        self.dataset
            .province_id(name)
            .ok_or_else(|| EngineError::invalid_argument(format!("unknown province '{}'", name)))
    }

    pub fn resolve_sector(&self, name: &str) -> EngineResult<SectorId> {
        self.profile
            .sector_id(name)
            .ok_or_else(|| EngineError::invalid_argument(format!("unknown sector '{}'", name)))
    }

    pub fn score(&self, province: ProvinceId, sector: SectorId) -> f64 {
        self.matrix.score(province, sector)
    }

    /// Mod-1: best provinces for a sector.
    pub fn top_provinces_for_sector(
        &self,
        sector: SectorId,
        n: usize,
    ) -> EngineResult<Vec<Ranked<ProvinceId>>> {
        check_top_n(n)?;
        Ok(top_n(self.sector_candidates(sector), n, self.policy.tie_epsilon))
    }

    /// Mod-2: best sectors for a province.
    pub fn top_sectors_for_province(
        &self,
        province: ProvinceId,
        n: usize,
    ) -> EngineResult<Vec<Ranked<SectorId>>> {
        check_top_n(n)?;
        Ok(top_n(
            self.province_candidates(province),
            n,
            self.policy.tie_epsilon,
        ))
    }

    /// Every province's score for a sector, ranked.
    pub fn rank_provinces(&self, sector: SectorId) -> Vec<Ranked<ProvinceId>> {
        rank(self.sector_candidates(sector), self.policy.tie_epsilon)
    }

    /// Every sector's score for a province, ranked.
    pub fn rank_sectors(&self, province: ProvinceId) -> Vec<Ranked<SectorId>> {
        rank(self.province_candidates(province), self.policy.tie_epsilon)
    }

    /// Per-indicator breakdown of one cell's score.
    pub fn attribution(&self, province: ProvinceId, sector: SectorId) -> Vec<Attribution> {
        attribute(
            self.profile.weights(sector),
            self.normalized.province(province),
        )
    }

    /// Mean score of each sector across all provinces, ranked.
    pub fn sector_averages(&self) -> Vec<Ranked<SectorId>> {
        let provinces = self.dataset.province_count() as f64;
        let candidates = (0..self.profile.sector_count()).map(|s| {
            let sector = SectorId(s);
            let mean = self.matrix.sector_column(sector).sum::<f64>() / provinces;
            (sector, self.profile.sector_name(sector), mean)
        });
        rank(candidates, self.policy.tie_epsilon)
    }

    /// Mean score of each province across all sectors, ranked.
    pub fn province_averages(&self) -> Vec<Ranked<ProvinceId>> {
        let sectors = self.profile.sector_count() as f64;
        let candidates = (0..self.dataset.province_count()).map(|p| {
            let province = ProvinceId(p);
            let mean = self.matrix.province_row(province).iter().sum::<f64>() / sectors;
            (province, self.dataset.province_name(province), mean)
        });
        rank(candidates, self.policy.tie_epsilon)
    }

    fn sector_candidates(
        &self,
        sector: SectorId,
    ) -> impl Iterator<Item = (ProvinceId, &str, f64)> + '_ {
        (0..self.dataset.province_count()).map(move |p| {
            let province = ProvinceId(p);
            (
                province,
                self.dataset.province_name(province),
                self.matrix.score(province, sector),
            )
        })
    }

    fn province_candidates(
        &self,
        province: ProvinceId,
    ) -> impl Iterator<Item = (SectorId, &str, f64)> + '_ {
        (0..self.profile.sector_count()).map(move |s| {
            let sector = SectorId(s);
            (
                sector,
                self.profile.sector_name(sector),
                self.matrix.score(province, sector),
            )
        })
    }
}

fn check_top_n(n: usize) -> EngineResult<()> {
    if n == 0 {
        return Err(EngineError::invalid_argument("top-N must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Direction, DirectionRow, MissingWeightPolicy, ProvinceRow, Registry, WeightRow};
    use std::collections::BTreeMap;

    fn province(name: &str, x: f64, y: f64) -> ProvinceRow {
        ProvinceRow {
            province: name.to_string(),
            values: [("x".to_string(), Some(x)), ("y".to_string(), Some(y))]
                .into_iter()
                .collect(),
        }
    }

    fn weight(sector: &str, indicator: &str, weight: f64) -> WeightRow {
        WeightRow {
            sector: sector.to_string(),
            indicator: indicator.to_string(),
            weight,
        }
    }

    /// Three provinces, a benefit and a cost indicator, two sectors.
    fn sources() -> Sources {
        Sources {
            values: vec![
                province("A", 10.0, 90.0),
                province("B", 50.0, 50.0),
                province("C", 90.0, 10.0),
            ],
            directions: vec![
                DirectionRow {
                    indicator: "x".to_string(),
                    direction: Some(Direction::Benefit),
                    label: None,
                },
                DirectionRow {
                    indicator: "y".to_string(),
                    direction: Some(Direction::Cost),
                    label: None,
                },
            ],
            weights: vec![
                weight("Even", "x", 0.5),
                weight("Even", "y", 0.5),
                weight("OnlyX", "x", 3.0),
                weight("OnlyX", "y", 0.0),
            ],
            registry: Registry {
                provinces: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                sectors: vec!["Even".to_string(), "OnlyX".to_string()],
                aliases: BTreeMap::new(),
            },
        }
    }

    fn engine() -> Engine {
        Engine::build(&sources(), EnginePolicy::default()).unwrap()
    }

    #[test]
    fn test_weighted_score() {
        assert_eq!(weighted_score(&[0.5, 0.5], &[100.0, 100.0]), 100.0);
        assert_eq!(weighted_score(&[1.0, 3.0], &[100.0, 0.0]), 25.0);
        // Weight scale is irrelevant
        assert_eq!(
            weighted_score(&[10.0, 30.0], &[100.0, 0.0]),
            weighted_score(&[0.1, 0.3], &[100.0, 0.0])
        );
    }

    #[test]
    fn test_matrix_scores() {
        let e = engine();
        let even = e.resolve_sector("Even").unwrap();
        let a = e.resolve_province("A").unwrap();
        let b = e.resolve_province("B").unwrap();
        let c = e.resolve_province("C").unwrap();
        assert_eq!(e.score(a, even), 0.0);
        assert_eq!(e.score(b, even), 50.0);
        assert_eq!(e.score(c, even), 100.0);
        assert_eq!(e.matrix().len(), 6);
    }

    #[test]
    fn test_top_provinces_for_sector() {
        let e = engine();
        let even = e.resolve_sector("even").unwrap();
        let top = e.top_provinces_for_sector(even, 2).unwrap();
        let names: Vec<&str> = top.iter().map(|r| e.dataset().province_name(r.id)).collect();
        assert_eq!(names, vec!["C", "B"]);
        assert_eq!(top[0].score, 100.0);
        assert_eq!(top[1].score, 50.0);
    }

    #[test]
    fn test_top_sectors_for_province_ties_by_name() {
        let e = engine();
        // C scores 100 in both sectors
        let c = e.resolve_province("C").unwrap();
        let top = e.top_sectors_for_province(c, 5).unwrap();
        let names: Vec<&str> = top.iter().map(|r| e.profile().sector_name(r.id)).collect();
        assert_eq!(names, vec!["Even", "OnlyX"]);
    }

    #[test]
    fn test_top_n_zero_rejected() {
        let e = engine();
        let even = e.resolve_sector("Even").unwrap();
        assert!(matches!(
            e.top_provinces_for_sector(even, 0),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_top_n_capped() {
        let e = engine();
        let even = e.resolve_sector("Even").unwrap();
        assert_eq!(e.top_provinces_for_sector(even, 50).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_names() {
        let e = engine();
        assert!(matches!(
            e.resolve_province("Atlantis"),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            e.resolve_sector("Madencilik"),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_attribution_for_top_province() {
        let e = engine();
        let c = e.resolve_province("C").unwrap();
        let even = e.resolve_sector("Even").unwrap();
        let attrs = e.attribution(c, even);
        assert_eq!(attrs.len(), 2);
        assert!((attrs[0].share - 0.5).abs() < 1e-12);
        assert!((attrs[1].share - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_sector_fails_build() {
        let mut src = sources();
        src.weights.retain(|w| w.sector != "OnlyX");
        src.weights.push(weight("OnlyX", "x", 0.0));
        match Engine::build(&src, EnginePolicy::default()) {
            Err(EngineError::Configuration(msg)) => assert!(msg.contains("OnlyX")),
            other => panic!("expected Configuration, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_overflowing_weight_sum_fails_build() {
        let mut src = sources();
        for w in src.weights.iter_mut().filter(|w| w.sector == "Even") {
            w.weight = 1e308;
        }
        match Engine::build(&src, EnginePolicy::default()) {
            Err(EngineError::Configuration(msg)) => assert!(msg.contains("Even")),
            other => panic!("expected Configuration, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unrepresentable_range_fails_build() {
        let mut src = sources();
        src.values[0] = province("A", -1e308, 90.0);
        src.values[2] = province("C", 1e308, 10.0);
        assert!(matches!(
            Engine::build(&src, EnginePolicy::default()),
            Err(EngineError::DataLoad(_))
        ));
    }

    #[test]
    fn test_reject_policy_propagates() {
        let mut src = sources();
        src.weights.retain(|w| !(w.sector == "OnlyX" && w.indicator == "y"));
        let policy = EnginePolicy {
            missing_weight: MissingWeightPolicy::Reject,
            ..EnginePolicy::default()
        };
        assert!(matches!(
            Engine::build(&src, policy),
            Err(EngineError::DataLoad(_))
        ));
        assert!(Engine::build(&src, EnginePolicy::default()).is_ok());
    }

    #[test]
    fn test_invalid_policy_fails_build() {
        let policy = EnginePolicy {
            tie_epsilon: -0.5,
            ..EnginePolicy::default()
        };
        assert!(matches!(
            Engine::build(&sources(), policy),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_averages() {
        let e = engine();
        let sectors = e.sector_averages();
        // Even: (0 + 50 + 100) / 3 = 50; OnlyX: (0 + 50 + 100) / 3 = 50 -> tie by name
        assert_eq!(e.profile().sector_name(sectors[0].id), "Even");
        assert!((sectors[0].score - 50.0).abs() < 1e-9);

        let provinces = e.province_averages();
        assert_eq!(e.dataset().province_name(provinces[0].id), "C");
        assert_eq!(provinces[0].score, 100.0);
    }

    #[test]
    fn test_shapes() {
        let shapes = engine().shapes();
        assert_eq!(
            shapes,
            Shapes {
                provinces: 3,
                indicators: 2,
                sectors: 2,
                weight_rows: 4,
                cells: 6,
            }
        );
    }
}
