//! Display-only narrative sentences keyed by sector.
//!
//! Nothing in here feeds back into scoring or ranking.

use crate::dataset::lookup_key;

type Template = fn(&str, f64) -> String;

fn tourism(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for tourism and hospitality, backed by its visitor-facing indicators.",
        province, score
    )
}

fn technology(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for technology and software, where skilled labour and education weigh most.",
        province, score
    )
}

fn manufacturing(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for industry and manufacturing, reflecting its production base and trade balance.",
        province, score
    )
}

fn agriculture(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for agriculture and livestock, driven by land availability.",
        province, score
    )
}

fn logistics(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for logistics, a measure of its transport reach and trade flows.",
        province, score
    )
}

fn healthcare(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for healthcare, weighted toward physician capacity and demographics.",
        province, score
    )
}

fn energy(province: &str, score: f64) -> String {
    format!("{} scores {:.1} for energy investment.", province, score)
}

fn housing(province: &str, score: f64) -> String {
    format!(
        "{} scores {:.1} for housing and construction, following migration and home-sales demand.",
        province, score
    )
}

fn generic(province: &str, score: f64) -> String {
    format!("{} scores {:.1} for this sector.", province, score)
}

fn template_for(sector: &str) -> Template {
    match lookup_key(sector).as_str() {
        "turizm otelcilik" | "turizm" => tourism,
        "teknoloji yazilim" | "teknoloji" => technology,
        "sanayi uretim" | "sanayi" => manufacturing,
        "tarim ve hayvancilik" | "tarim" => agriculture,
        "lojistik" => logistics,
        "saglik" => healthcare,
        "enerji" => energy,
        "konut & insaat" | "konut ve insaat" => housing,
        _ => generic,
    }
}

/// A one-sentence summary of how a province fares for a sector.
pub fn sentence_for(sector: &str, province: &str, score: f64) -> String {
    template_for(sector)(province, score)
}
