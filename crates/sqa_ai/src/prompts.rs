pub fn expand_answer_prompt(question: &str, context: &str) -> String {
    // The context is already the best-matching study text; the model only elaborates on it.
    format!(
        r#"Context: "{context}"
Question: "{question}"

Instructions:
1. Analyze the context and question carefully.
2. Provide a comprehensive answer that:
   - Explains the main concepts
   - Adds relevant examples or analogies
   - Connects different ideas
   - Includes additional insights
   - Uses your own words to explain
3. Make sure to:
   - Expand on the key points
   - Add explanatory details
   - Make complex ideas easier to understand
   - Include practical implications where relevant

Please provide a detailed, well-structured answer:
"#
    )
}
