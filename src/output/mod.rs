pub mod formatter;

pub use formatter::{
    format_breakdown, format_ranked_table, format_score, format_tree, format_tsv, rank_subjects,
    should_use_colors, RankedSubject,
};
