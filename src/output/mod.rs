pub mod formatter;
pub mod narrative;

pub use formatter::{
    format_averages, format_explanation, format_json, format_ranked_table, format_ranked_tsv,
    format_reasons, format_score, format_score_map, indicator_label, named, should_use_colors,
};
pub use narrative::sentence_for;
