//! Prompt builders for the curation oracle calls.
//!
//! The classification prompt pins the closed primary set and the
//! `primary/secondary` reply shape; the decision prompts pin exact
//! yes/no tokens so parsing stays mechanical.

use crate::inventory::DocumentInfo;

pub fn classify(name: &str, sample: &str) -> String {
    format!(
        "Classify the following document into a two-level category.\n\n\
         File name: {name}\n\
         Content sample:\n{sample}\n\n\
         Rules:\n\
         1. The primary category must be one of: technical (technology and \
         science), humanities (humanities and social sciences), lifestyle \
         (everyday life, health, education, economics), other.\n\
         2. Choose a concise secondary label under it (a few words, no \
         punctuation). Use \"general\" if no secondary is warranted.\n\
         3. Reply with exactly \"primary/secondary\" and nothing else, e.g. \
         \"technical/machine_learning\".\n\
         4. If the content is low-value or unclassifiable, reply \
         \"other/unclassified\"."
    )
}

pub fn merge_judgment(docs: &[&DocumentInfo], sample_chars: usize) -> String {
    let samples = docs
        .iter()
        .map(|doc| {
            format!(
                "File: {}\nContent: {}",
                doc.name,
                crate::inventory::char_prefix(&doc.content, sample_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Decide whether these documents are cohesive enough to merge into \
         one consolidated document.\n\n{samples}\n\n\
         Merge only if they share one core topic, complement each other, or \
         repeat each other; do not merge documents about different topics.\n\
         Reply with exactly \"yes\" or \"no\" and nothing else."
    )
}

pub fn topic_tag(doc: &DocumentInfo, sample_chars: usize) -> String {
    format!(
        "Give one core topic tag (at most a few words) for this document.\n\n\
         File: {}\nContent: {}\n\n\
         Reply with the tag only, nothing else.",
        doc.name,
        crate::inventory::char_prefix(&doc.content, sample_chars)
    )
}

pub fn synthesize(docs: &[&DocumentInfo]) -> String {
    let contents = docs
        .iter()
        .map(|doc| format!("## {}\n{}", doc.name, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Merge the following documents into one coherent knowledge \
         document.\n\n{contents}\n\n\
         Requirements: keep every valuable point, remove repetition, \
         organize under clear headings (core concepts, applications, \
         details, outlook — skip headings that do not apply), and keep the \
         language natural. Reply with the merged document only."
    )
}

pub fn filename(name: &str, sample: &str) -> String {
    format!(
        "Propose a file name for this document.\n\n\
         Current name: {name}\nContent: {sample}\n\n\
         Rules: concise, reflects the core content, no dates or timestamps, \
         no punctuation beyond underscores, at most a few words. Reply with \
         the name only, without an extension."
    )
}

pub fn merged_filename(theme: &str, docs: &[&DocumentInfo], sample_chars: usize) -> String {
    let samples = docs
        .iter()
        .take(2)
        .map(|doc| {
            format!(
                "File: {}\nContent: {}",
                doc.name,
                crate::inventory::char_prefix(&doc.content, sample_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Propose a file name for a document consolidating the theme \
         \"{theme}\" from these sources:\n\n{samples}\n\n\
         Rules: concise, reflects the consolidated content, no punctuation \
         beyond underscores. Reply with the name only, without an extension."
    )
}

pub fn extract_note(user_text: &str, assistant_text: &str) -> String {
    format!(
        "Extract the valuable knowledge from this exchange as a structured \
         note.\n\n\
         User input: {user_text}\n\
         Assistant reply: {assistant_text}\n\n\
         Use exactly this template:\n\
         ## Topic\n[one line]\n\n\
         ## Key points\n- [point]\n\n\
         ## Details\n[short prose]\n\n\
         ## Applications\n[where this knowledge applies]"
    )
}

pub fn novelty(user_text: &str, assistant_text: &str, existing: &str) -> String {
    format!(
        "Decide whether this exchange adds knowledge not already covered.\n\n\
         User input: {user_text}\n\
         Assistant reply: {assistant_text}\n\n\
         Already in the knowledge base:\n{existing}\n\n\
         Reply \"yes\" if the exchange contains new, valuable information; \
         reply \"no\" if it only repeats what is already stored. Reply with \
         exactly \"yes\" or \"no\" and nothing else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prompt_names_the_closed_set() {
        let prompt = classify("doc.txt", "sample");
        for primary in ["technical", "humanities", "lifestyle", "other"] {
            assert!(prompt.contains(primary));
        }
        assert!(prompt.contains("other/unclassified"));
    }
}
