use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use super::narrative::sentence_for;
use crate::dataset::lookup_key;
use crate::query::{
    legend_bucket, CellExplanation, IndicatorShare, Mode, QueryResponse, ReasonItem, ScoreMap,
};
use crate::scoring::{Ranked, ReasonKind};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-100 score with one decimal ("63.7")
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Format a 0-1 share as a percentage ("42%")
pub fn format_share(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

/// Curated labels for well-known indicator keys, tried in order against the folded id.
/// A rule matches when each of its groups has at least one substring in the key.
const KNOWN_LABELS: &[(&[&[&str]], &str)] = &[
    (&[&["konut"], &["satis"]], "Konut satışı"),
    (&[&["toplu"], &["tasima"], &["memnun"]], "Toplu taşıma memnuniyeti"),
    (&[&["universite"]], "Üniversite ve üstü oranı"),
    (&[&["ihracat", "ithalat"]], "İhracat–İthalat farkı"),
    (&[&["goc"]], "Göç cazibesi"),
    (&[&["tarim"]], "Tarım alanı"),
    (&[&["hastane"], &["hekim", "doktor"]], "Hekim/Hastane oranı"),
    (&[&["ortalama"], &["yas"]], "Ortalama yaş"),
    (&[&["istihdam"]], "İstihdam oranı"),
    (&[&["toplu"], &["tasima"]], "Toplu taşıma"),
];

/// Per-capita marker appended to population-normalized indicator ids.
const PER_CAPITA_SUFFIX: &str = "bolunufus";

fn known_label(id: &str) -> Option<&'static str> {
    let key = lookup_key(id);
    KNOWN_LABELS
        .iter()
        .find(|(groups, _)| {
            groups
                .iter()
                .all(|group| group.iter().any(|sub| key.contains(sub)))
        })
        .map(|(_, label)| *label)
}

/// Human-readable label for an indicator.
///
/// Precedence: the declared label, then a curated label for well-known keys, then a title
/// derived from the id. The derived title turns separators into spaces, splits camel case
/// and drops a trailing `BOLUNUFUS` (any case): `"DoktorSayisiBOLUNUFUS"` -> `"Doktor Sayisi"`.
pub fn indicator_label(id: &str, label: Option<&str>) -> String {
    if let Some(label) = label {
        return label.to_string();
    }
    if let Some(known) = known_label(id) {
        return known.to_string();
    }

    let key = id
        .len()
        .checked_sub(PER_CAPITA_SUFFIX.len())
        .filter(|&cut| {
            id.is_char_boundary(cut) && id[cut..].eq_ignore_ascii_case(PER_CAPITA_SUFFIX)
        })
        .map_or(id, |cut| &id[..cut]);

    let chars: Vec<char> = key
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.') { ' ' } else { c })
        .collect();
    let mut spaced = String::with_capacity(key.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                spaced.push(' ');
            }
        }
        spaced.push(c);
    }

    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut rest = collapsed.chars();
    if let Some(first) = rest.next() {
        out.extend(first.to_uppercase());
        out.extend(rest);
    }
    out
}

/// Render reasons as "+ Label, + Label, ⚠ Label"
pub fn format_reasons(reasons: &[ReasonItem]) -> String {
    reasons
        .iter()
        .map(|r| {
            let marker = match r.kind {
                ReasonKind::Strength => "+",
                ReasonKind::Risk => "⚠",
            };
            format!(
                "{} {}",
                marker,
                indicator_label(&r.indicator, r.label.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Format a ranked query answer as a table: Index, Score, Name, Reasons
/// No headers (minimal format). With `narrative`, each row is followed by an
/// indented display sentence.
pub fn format_ranked_table(response: &QueryResponse, use_colors: bool, narrative: bool) -> String {
    if response.items.is_empty() {
        return "No results.".to_string();
    }

    let term_width = get_terminal_width();
    let name_width = response
        .items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);
    let score_width = 5; // "100.0"
    let separator = "  ";
    let fixed_width = 3 + 1 + score_width + separator.len() * 2 + name_width;

    response
        .items
        .iter()
        .map(|item| {
            let index_str = format!("{:>2}.", item.rank);
            let score_str = format!("{:>width$}", format_score(item.score), width = score_width);
            let name_str = pad_right(&item.name, name_width);
            let reasons = format_reasons(&item.reasons);
            let reasons = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_text(&reasons, width - fixed_width)
                }
                _ => reasons,
            };

            let mut line = if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    name_str.cyan(),
                    separator,
                    reasons
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, score_str, separator, name_str, separator, reasons
                )
            };

            if narrative {
                let (sector, province) = match response.mode {
                    Mode::SectorToProvince => (response.subject.as_str(), item.name.as_str()),
                    Mode::ProvinceToSector => (item.name.as_str(), response.subject.as_str()),
                };
                let sentence = sentence_for(sector, province, item.score);
                line.push_str("\n     ");
                if use_colors {
                    line.push_str(&sentence.italic().to_string());
                } else {
                    line.push_str(&sentence);
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a ranked query answer as tab-separated values for scripting
/// Columns: rank, score, name, reasons (no headers, no colors)
pub fn format_ranked_tsv(response: &QueryResponse) -> String {
    response
        .items
        .iter()
        .map(|item| {
            format!(
                "{}\t{}\t{}\t{}",
                item.rank,
                format_score(item.score),
                item.name,
                format_reasons(&item.reasons)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the full attribution of one cell
pub fn format_explanation(explanation: &CellExplanation, use_colors: bool) -> String {
    let header = format!(
        "{} / {}: {}",
        explanation.province,
        explanation.sector,
        format_score(explanation.score)
    );
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    if explanation.attributions.is_empty() {
        lines.push("  No indicator contributes to this score.".to_string());
        return lines.join("\n");
    }

    let labels: Vec<String> = explanation
        .attributions
        .iter()
        .map(|a| indicator_label(&a.indicator, a.label.as_deref()))
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for (share, label) in explanation.attributions.iter().zip(&labels) {
        lines.push(format_share_row(share, label, label_width));
    }
    lines.join("\n")
}

fn format_share_row(share: &IndicatorShare, label: &str, label_width: usize) -> String {
    format!(
        "  {}  {:>4}  +{:>5} pts  (weight {}, normalized {:.1}, {})",
        pad_right(label, label_width),
        format_share(share.share),
        format_score(share.points),
        share.weight,
        share.normalized,
        share.direction.as_str()
    )
}

/// Format a full score map with each entry's legend band
/// Columns: Name, Score, Band (e.g. "40-60")
pub fn format_score_map(map: &ScoreMap, use_colors: bool) -> String {
    let name_width = map
        .scores
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    let header = match map.mode {
        Mode::SectorToProvince => format!("Provinces scored for {}", map.subject),
        Mode::ProvinceToSector => format!("Sectors scored for {}", map.subject),
    };
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for (name, score) in &map.scores {
        let band = legend_bucket(*score);
        lines.push(format!(
            "  {}  {:>5}  {}-{}",
            pad_right(name, name_width),
            format_score(*score),
            map.legend[band],
            map.legend[band + 1]
        ));
    }
    lines.join("\n")
}

/// Format a ranked list of averages under a title
pub fn format_averages(title: &str, rows: &[(String, f64)], use_colors: bool) -> String {
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    }];
    for (idx, (name, score)) in rows.iter().enumerate() {
        lines.push(format!("{:>3}. {}: {}", idx + 1, name, format_score(*score)));
    }
    lines.join("\n")
}

/// Attach names to ranked ids for `format_averages`
pub fn named<T: Copy>(ranked: &[Ranked<T>], name: impl Fn(T) -> String) -> Vec<(String, f64)> {
    ranked.iter().map(|r| (name(r.id), r.score)).collect()
}

/// Pretty JSON for `--format json`
pub fn format_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
