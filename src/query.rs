//! The two read queries the engine serves, plus the score-map and explanation views
//! built on top of them. Everything here is computed fresh per call and owned by the caller.

use serde::{Deserialize, Serialize};

use crate::dataset::{Direction, ProvinceId, SectorId};
use crate::error::EngineResult;
use crate::scoring::{select_reasons, Attribution, Engine, Ranked, ReasonKind};

/// Fixed legend breaks for choropleth-style consumers.
pub const LEGEND_BREAKS: [f64; 6] = [0.0, 20.0, 40.0, 60.0, 80.0, 100.0];

/// Query direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Mod-1: fix a sector, rank provinces
    SectorToProvince,
    /// Mod-2: fix a province, rank sectors
    ProvinceToSector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub mode: Mode,
    /// Sector name for Mod-1, province name for Mod-2
    pub subject: String,
    pub top_n: usize,
}

/// How many structured reasons to attach per ranked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonOptions {
    pub strengths: usize,
    pub include_risk: bool,
}

impl Default for ReasonOptions {
    fn default() -> Self {
        Self {
            strengths: 2,
            include_risk: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorShare {
    pub indicator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub direction: Direction,
    pub weight: f64,
    pub normalized: f64,
    pub points: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonItem {
    pub kind: ReasonKind,
    pub indicator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    /// 1-based position
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub reasons: Vec<ReasonItem>,
    pub attributions: Vec<IndicatorShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub mode: Mode,
    /// Canonical name of the fixed sector or province
    pub subject: String,
    pub items: Vec<RankedItem>,
}

/// Every score along one axis, for map-style rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMap {
    pub mode: Mode,
    pub subject: String,
    /// `(name, score)` in name order
    pub scores: Vec<(String, f64)>,
    pub legend: [f64; 6],
}

/// Full breakdown of a single (province, sector) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellExplanation {
    pub province: String,
    pub sector: String,
    pub score: f64,
    pub attributions: Vec<IndicatorShare>,
}

/// Answer a Mod-1 or Mod-2 query.
pub fn run_query(
    engine: &Engine,
    query: &Query,
    reasons: &ReasonOptions,
) -> EngineResult<QueryResponse> {
    let (subject, items) = match query.mode {
        Mode::SectorToProvince => {
            let sector = engine.resolve_sector(&query.subject)?;
            let ranked = engine.top_provinces_for_sector(sector, query.top_n)?;
            let items = build_items(engine, ranked, reasons, |p| (p, sector), |p| {
                engine.dataset().province_name(p).to_string()
            });
            (engine.profile().sector_name(sector).to_string(), items)
        }
        Mode::ProvinceToSector => {
            let province = engine.resolve_province(&query.subject)?;
            let ranked = engine.top_sectors_for_province(province, query.top_n)?;
            let items = build_items(engine, ranked, reasons, |s| (province, s), |s| {
                engine.profile().sector_name(s).to_string()
            });
            (engine.dataset().province_name(province).to_string(), items)
        }
    };

    tracing::debug!(
        mode = ?query.mode,
        subject = %subject,
        requested = query.top_n,
        returned = items.len(),
        "query answered"
    );

    Ok(QueryResponse {
        mode: query.mode,
        subject,
        items,
    })
}

/// All scores for one sector (Mod-1 map) or one province (Mod-2 map).
pub fn score_map(engine: &Engine, mode: Mode, subject: &str) -> EngineResult<ScoreMap> {
    let (subject, mut scores) = match mode {
        Mode::SectorToProvince => {
            let sector = engine.resolve_sector(subject)?;
            let scores: Vec<(String, f64)> = engine
                .dataset()
                .province_names()
                .iter()
                .zip(engine.matrix().sector_column(sector))
                .map(|(name, score)| (name.clone(), score))
                .collect();
            (engine.profile().sector_name(sector).to_string(), scores)
        }
        Mode::ProvinceToSector => {
            let province = engine.resolve_province(subject)?;
            let scores: Vec<(String, f64)> = engine
                .profile()
                .sector_names()
                .iter()
                .zip(engine.matrix().province_row(province))
                .map(|(name, score)| (name.clone(), *score))
                .collect();
            (engine.dataset().province_name(province).to_string(), scores)
        }
    };
    scores.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(ScoreMap {
        mode,
        subject,
        scores,
        legend: LEGEND_BREAKS,
    })
}

/// Attribution table for one province and sector.
pub fn explain_cell(engine: &Engine, province: &str, sector: &str) -> EngineResult<CellExplanation> {
    let p = engine.resolve_province(province)?;
    let s = engine.resolve_sector(sector)?;
    Ok(CellExplanation {
        province: engine.dataset().province_name(p).to_string(),
        sector: engine.profile().sector_name(s).to_string(),
        score: engine.score(p, s),
        attributions: shares(engine, &engine.attribution(p, s)),
    })
}

/// Index of the legend band a score falls into (0..=4).
pub fn legend_bucket(score: f64) -> usize {
    LEGEND_BREAKS[1..LEGEND_BREAKS.len() - 1]
        .iter()
        .take_while(|&&edge| score >= edge)
        .count()
}

fn build_items<T: Copy>(
    engine: &Engine,
    ranked: Vec<Ranked<T>>,
    opts: &ReasonOptions,
    cell: impl Fn(T) -> (ProvinceId, SectorId),
    name: impl Fn(T) -> String,
) -> Vec<RankedItem> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, r)| {
            let (p, s) = cell(r.id);
            let attributions = engine.attribution(p, s);
            let reasons = select_reasons(&attributions, opts.strengths, opts.include_risk)
                .into_iter()
                .map(|reason| {
                    let indicator = engine.dataset().indicator(reason.indicator);
                    ReasonItem {
                        kind: reason.kind,
                        indicator: indicator.id.clone(),
                        label: indicator.label.clone(),
                        share: reason.share,
                    }
                })
                .collect();
            RankedItem {
                rank: idx + 1,
                name: name(r.id),
                score: r.score,
                reasons,
                attributions: shares(engine, &attributions),
            }
        })
        .collect()
}

fn shares(engine: &Engine, attributions: &[Attribution]) -> Vec<IndicatorShare> {
    attributions
        .iter()
        .map(|a| {
            let indicator = engine.dataset().indicator(a.indicator);
            IndicatorShare {
                indicator: indicator.id.clone(),
                label: indicator.label.clone(),
                direction: indicator.direction,
                weight: a.weight,
                normalized: a.normalized,
                points: a.points,
                share: a.share,
            }
        })
        .collect()
}
