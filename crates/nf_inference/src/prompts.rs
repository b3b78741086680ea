//! Prompt templates sent to the chat model.

use nf_core::Sentiment;

pub fn sentiment_prompt(title: &str, description: &str) -> String {
    format!(
        "Analyze the sentiment of the following news article. Consider:\n\
         1. Overall tone (positive, negative, neutral)\n\n\
         Title: {title}\n\
         Description: {description}\n\n\
         Provide the analysis in the following JSON format:\n\
         {{\n    \"sentiment\": \"positive/negative/neutral\"\n}}"
    )
}

pub fn summary_prompt(title: &str, description: &str, sentiment: Sentiment) -> String {
    format!(
        "Summarize the following news article concisely while maintaining key information.\n\n\
         Title: {title}\n\
         Description: {description}\n\
         Sentiment: {sentiment}\n\n\
         Guidelines:\n\
         1. Create a clear, concise summary (2-3 sentences)\n\
         2. Maintain factual accuracy\n\
         3. Include key points and implications\n\
         4. Keep the tone consistent with the original\n\
         5. Highlight any significant market or industry impact\n\n\
         Provide the summary in a clear, readable format.\n"
    )
}
