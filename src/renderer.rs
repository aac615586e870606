//! Rewriting of selected word segments into annotated replacements
//!
//! Only word segments chosen by the selector are rewritten. Every other
//! segment is copied through byte for byte, which keeps markup intact as long
//! as the tokenizer never let a word cross into tag syntax.

use serde::{Deserialize, Serialize};

use crate::models::{ForeignWordRecord, WordEntry, normalize_word};
use crate::selector::Selection;
use crate::tokenizer::Segment;

/// How a substituted word is written into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// `<span class="foreign-word" data-original=".." data-entry-id="..">casa</span>`
    #[default]
    Markup,
    /// The bare target word
    Plain,
    /// `casa (house)`
    Bracketed,
}

/// Rendered content plus one record per substituted occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub foreign_words: Vec<ForeignWordRecord>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionRenderer {
    mode: RenderMode,
}

impl SubstitutionRenderer {
    pub const CSS_CLASS: &'static str = "foreign-word";

    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Replacement text for one occurrence of `original`
    ///
    /// The target word keeps the dictionary entry's own casing, not the casing
    /// found in the source text.
    pub fn render_word(&self, original: &str, entry: &WordEntry) -> String {
        match self.mode {
            RenderMode::Plain => entry.target_word.clone(),
            RenderMode::Bracketed => format!("{} ({})", entry.target_word, original),
            RenderMode::Markup => {
                let mut out = format!(
                    "<span class=\"{}\" data-original=\"{}\" data-entry-id=\"{}\"",
                    Self::CSS_CLASS,
                    escape_html(original),
                    escape_html(&entry.id)
                );
                if let Some(pronunciation) = &entry.pronunciation {
                    out.push_str(&format!(
                        " data-pronunciation=\"{}\"",
                        escape_html(pronunciation)
                    ));
                }
                out.push('>');
                out.push_str(&escape_html(&entry.target_word));
                out.push_str("</span>");
                out
            }
        }
    }

    /// Rebuild the content with every chosen word substituted
    pub fn render(&self, segments: &[Segment<'_>], selection: &Selection<'_>) -> Rendered {
        let mut content = String::new();
        let mut foreign_words = Vec::new();

        for segment in segments {
            let entry = if segment.is_word() {
                selection.entry_for(&normalize_word(segment.text))
            } else {
                None
            };

            match entry {
                Some(entry) => {
                    content.push_str(&self.render_word(segment.text, entry));
                    foreign_words.push(ForeignWordRecord {
                        original_word: segment.text.to_string(),
                        foreign_word: entry.target_word.clone(),
                        start_index: segment.start,
                        end_index: segment.end(),
                        word_entry: entry.clone(),
                    });
                }
                None => content.push_str(segment.text),
            }
        }

        Rendered { content, foreign_words }
    }
}

/// Escape text for use inside HTML text nodes and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::ProficiencyLevel;
    use crate::tokenizer::tokenize;

    fn casa() -> WordEntry {
        WordEntry {
            id: "en-es-house".to_string(),
            source_word: "house".to_string(),
            target_word: "casa".to_string(),
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            proficiency_level: ProficiencyLevel::Beginner,
            frequency_rank: 10,
            part_of_speech: "noun".to_string(),
            variants: Vec::new(),
            pronunciation: None,
        }
    }

    fn selection_of(entry: &WordEntry) -> Selection<'_> {
        let mut chosen = HashMap::new();
        chosen.insert(normalize_word(&entry.source_word), entry);
        Selection { chosen, total_words: 0, eligible_words: 1 }
    }

    #[test]
    fn test_markup_rendering() {
        let renderer = SubstitutionRenderer::new(RenderMode::Markup);
        assert_eq!(
            renderer.render_word("House", &casa()),
            "<span class=\"foreign-word\" data-original=\"House\" data-entry-id=\"en-es-house\">casa</span>"
        );
    }

    #[test]
    fn test_markup_includes_pronunciation() {
        let mut entry = casa();
        entry.pronunciation = Some("ˈka.sa".to_string());
        let rendered = SubstitutionRenderer::default().render_word("house", &entry);
        assert!(rendered.contains("data-pronunciation=\"ˈka.sa\""));
    }

    #[test]
    fn test_markup_escapes_attribute_values() {
        let mut entry = casa();
        entry.id = "a\"b<c>".to_string();
        entry.target_word = "R&D".to_string();
        let rendered = SubstitutionRenderer::default().render_word("house", &entry);
        assert!(rendered.contains("data-entry-id=\"a&quot;b&lt;c&gt;\""));
        assert!(rendered.contains(">R&amp;D</span>"));
    }

    #[test]
    fn test_plain_and_bracketed_modes() {
        assert_eq!(SubstitutionRenderer::new(RenderMode::Plain).render_word("House", &casa()), "casa");
        assert_eq!(
            SubstitutionRenderer::new(RenderMode::Bracketed).render_word("House", &casa()),
            "casa (House)"
        );
    }

    #[test]
    fn test_target_casing_comes_from_entry() {
        let mut entry = casa();
        entry.target_word = "Casa".to_string();
        let renderer = SubstitutionRenderer::new(RenderMode::Plain);
        assert_eq!(renderer.render_word("HOUSE", &entry), "Casa");
        assert_eq!(renderer.render_word("house", &entry), "Casa");
    }

    #[test]
    fn test_render_passes_other_segments_through() {
        let entry = casa();
        let content = "<p class=\"x\">The House, the house!</p>";
        let segments = tokenize(content);
        let rendered = SubstitutionRenderer::new(RenderMode::Plain).render(&segments, &selection_of(&entry));

        assert_eq!(rendered.content, "<p class=\"x\">The casa, the casa!</p>");
        assert_eq!(rendered.foreign_words.len(), 2);
        assert_eq!(rendered.foreign_words[0].original_word, "House");
        assert_eq!(&content[rendered.foreign_words[0].start_index..rendered.foreign_words[0].end_index], "House");
        assert!(rendered.foreign_words[0].start_index < rendered.foreign_words[1].start_index);
    }

    #[test]
    fn test_render_with_empty_selection_is_identity() {
        let content = "Nothing <em>to</em> replace &amp; more";
        let segments = tokenize(content);
        let rendered = SubstitutionRenderer::default().render(&segments, &Selection::default());
        assert_eq!(rendered.content, content);
        assert!(rendered.foreign_words.is_empty());
    }
}
