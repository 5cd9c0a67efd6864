use super::{
    blob::{recover_structured, social_profiles, CandidateFields, SocialProfile},
    SearchResult,
};

pub const ENTRY_SEPARATOR: &str = "\n\n";
pub const UNKNOWN_NAME: &str = "Unknown";
pub const MISSING_SUMMARY: &str = "(No summary provided)";
pub const SNIPPET_WORDS: usize = 10;

/// Display-ready view of one search result.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateView {
    pub name: String,
    pub file_identifier: String,
    pub employee_id: Option<String>,
    pub summary: String,
    pub snippet: String,
    pub keyword_score: Option<f64>,
    pub vector_score: Option<f64>,
    pub hybrid_score: Option<f64>,
    pub score: Option<f64>,
    pub profiles: Vec<SocialProfile>,
}

impl CandidateView {
    pub fn from_result(result: &SearchResult, filename_suffix: &str) -> Self {
        let fields = CandidateFields::extract(&result.text);
        let profiles = recover_structured(&result.text)
            .map(|record| social_profiles(&record))
            .unwrap_or_default();

        Self {
            name: fields.name.unwrap_or_else(|| UNKNOWN_NAME.to_owned()),
            file_identifier: strip_filename_suffix(&result.filename, filename_suffix),
            employee_id: fields.employee_id,
            summary: fields.summary.unwrap_or_else(|| MISSING_SUMMARY.to_owned()),
            snippet: snippet(&result.text),
            keyword_score: result.keyword_score,
            vector_score: result.vector_score,
            hybrid_score: result.hybrid_score,
            score: result.score,
            profiles,
        }
    }

    /// Identifier shown on cards: an embedded `employee_id` wins over the filename.
    pub fn card_identifier(&self) -> &str {
        self.employee_id.as_deref().unwrap_or(&self.file_identifier)
    }

    /// Single relevance score shown on cards, four decimals.
    pub fn card_score(&self) -> String {
        self.score
            .or(self.hybrid_score)
            .map_or_else(|| "N/A".to_owned(), |value| format!("{value:.4}"))
    }
}

pub fn strip_filename_suffix(filename: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return filename.to_owned();
    }
    filename.strip_suffix(suffix).unwrap_or(filename).to_owned()
}

fn snippet(text: &str) -> String {
    let words = text.split_whitespace().take(SNIPPET_WORDS).collect::<Vec<_>>().join(" ");
    format!("{words} ...")
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "N/A".to_owned(), |value| value.to_string())
}

pub fn render_text_entry(view: &CandidateView) -> String {
    let mut lines = vec![
        format!("🧑 *{}*", view.name),
        format!("📄 *Employee ID:* `{}`", view.file_identifier),
        format!("- **Keyword Score:** {}", format_score(view.keyword_score)),
        format!("- **Vector Score:** {}", format_score(view.vector_score)),
        format!("- **Hybrid Score:** {}", format_score(view.hybrid_score)),
        format!("- **Summary Snippet:** `{}`", view.snippet),
    ];

    if !view.profiles.is_empty() {
        let profiles =
            view.profiles.iter().map(SocialProfile::markdown).collect::<Vec<_>>().join(" | ");
        lines.push(format!("- **Profiles:** {profiles}"));
    }

    lines.join("\n")
}

/// Packs entries, in order, into chunks of at most `limit` characters joined
/// by [`ENTRY_SEPARATOR`]. While every entry fits within `limit`, joining the
/// chunks with the separator gives back the joined entries.
///
/// An entry longer than `limit` on its own is the exception: it is split on
/// character boundaries into consecutive chunks (possibly mid-markdown), so the
/// pieces concatenate to the entry but the separator join no longer matches.
pub fn chunk_entries(entries: &[String], limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let separator_len = ENTRY_SEPARATOR.chars().count();
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut current_entries = 0usize;

    for entry in entries {
        let entry_len = entry.chars().count();

        if entry_len > limit {
            if current_entries > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                current_entries = 0;
            }
            chunks.extend(split_by_chars(entry, limit));
            continue;
        }

        let joined_len =
            if current_entries == 0 { entry_len } else { current_len + separator_len + entry_len };

        if joined_len > limit {
            chunks.push(std::mem::take(&mut current));
            current.push_str(entry);
            current_len = entry_len;
            current_entries = 1;
        } else {
            if current_entries > 0 {
                current.push_str(ENTRY_SEPARATOR);
            }
            current.push_str(entry);
            current_len = joined_len;
            current_entries += 1;
        }
    }

    if current_entries > 0 {
        chunks.push(current);
    }

    chunks
}

fn split_by_chars(text: &str, limit: usize) -> Vec<String> {
    let chars = text.chars().collect::<Vec<_>>();
    chars.chunks(limit).map(|piece| piece.iter().collect()).collect()
}
