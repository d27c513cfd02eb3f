//! Prompt builders for the pipeline's oracle-backed stages.
//!
//! Each prompt pins the exact reply shape so the parsers in
//! `loreweave_oracle::reply` stay trivial; any drift from the demanded
//! shape is a `MalformedReply` and falls back.

use loreweave_core::session::Turn;

pub fn clarity(input: &str) -> String {
    format!(
        "Decide whether the following user input is clear enough to act on:\n\
         \"{input}\"\n\n\
         Reply with exactly \"clear\" or \"unclear\" and nothing else."
    )
}

pub fn intents(input: &str) -> String {
    format!(
        "The following user input was judged unclear:\n\
         \"{input}\"\n\n\
         Guess 3 to 5 plausible intents behind it. Reply with JSON only, in this shape:\n\
         {{\n\
           \"candidate_intents\": [\n\
             {{ \"id\": \"short_slug\", \"title\": \"short title\", \"description\": \"one sentence\" }}\n\
           ],\n\
           \"need_more_info\": {{ \"title\": \"short title\", \"description\": \"one sentence\" }}\n\
         }}"
    )
}

pub fn rewrite(input: &str) -> String {
    format!(
        "Rewrite the following user input for clarity without changing its meaning:\n\
         \"{input}\"\n\n\
         Reply with JSON only:\n\
         {{ \"rewritten_input\": \"...\", \"changes\": [\"...\"], \"reasoning\": \"...\" }}"
    )
}

pub fn summarize(history: &[Turn]) -> String {
    let mut prompt = String::from("Summarize the key information in this conversation history:\n");
    for turn in history {
        prompt.push_str(&turn.render());
        prompt.push('\n');
    }
    prompt.push_str("\nSummary:");
    prompt
}

pub fn context_need(input: &str, summary: &str) -> String {
    format!(
        "Given this conversation summary and the current user input, decide whether the \
         full conversation context is needed to answer well.\n\
         Summary: {summary}\n\
         Current input: {input}\n\n\
         Reply with exactly \"yes\" or \"no\" and nothing else."
    )
}

pub fn intent_analysis(input: &str) -> String {
    format!(
        "Analyze the intent and requirements behind this user input:\n\
         \"{input}\"\n\n\
         Reply with JSON only:\n\
         {{ \"intent\": \"...\", \"requirements\": \"...\", \"insufficiency\": \"...\", \"summary\": \"...\" }}"
    )
}

pub fn reflection(user_text: &str, assistant_text: &str) -> String {
    format!(
        "Reflect on this exchange and identify how the answering strategy could improve.\n\
         User: {user_text}\n\
         Assistant: {assistant_text}\n\n\
         Reply with JSON only:\n\
         {{ \"improvement_strategy\": \"...\", \"summary\": \"...\" }}"
    )
}
