//! Creator assistant: chat replies, caption drafts, trend hints and content
//! ideas. Every operation answers even when no model is configured or the
//! model call fails; those paths return canned fallbacks.

use std::sync::{Arc, LazyLock};

use rand::Rng;
use regex::Regex;
use serde::Serialize;

use crate::constants::CHAT_HISTORY_WINDOW;
use crate::models::{HistoryMessage, Sender};
use crate::services::llm::{ChatModel, CompletionRequest, PromptMessage};

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\w+").expect("hashtag pattern is valid")
});

const LIST_MARKERS: &str = "-•*0123456789.) ";

const DEFAULT_HASHTAGS: [&str; 5] = ["#trending", "#viral", "#fyp", "#foryou", "#content"];

/// Used when the model answered but named no hashtags
const MODEL_FALLBACK_HASHTAGS: [&str; 5] = ["#trending", "#viral", "#fyp", "#content", "#tiktok"];

const MODEL_TRENDS: [&str; 5] = [
    "AI-generated content",
    "Behind-the-scenes videos",
    "Quick tutorials",
    "Day-in-the-life content",
    "Reaction videos",
];

const MODEL_SUGGESTIONS: [&str; 3] = [
    "Show your creative process",
    "Ask engaging questions in your captions",
    "Use trending audio tracks",
];

const DEFAULT_TRENDS: [&str; 5] = [
    "Behind-the-scenes content",
    "Day-in-the-life videos",
    "Quick tutorials and tips",
    "Before/after transformations",
    "Reaction and response videos",
];

const DEFAULT_SUGGESTIONS: [&str; 3] = [
    "Show your authentic self",
    "Engage with your audience through questions",
    "Post consistently for better reach",
];

const TREND_IDEAS_FALLBACK: &str = "\
• Behind-the-scenes 10s cut with a reveal — try #BTS
• 'I tried X so you don't have to' quick review — try #HonestReview
• 3 fast tips with on-screen text — try #ProTips
• 'Day in the life' montage with time stamps — try #DayInMyLife
• Before/After transformation with beat drop — try #GlowUp";

/// A drafted caption with alternates
#[derive(Debug, Clone, Serialize)]
pub struct CaptionDraft {
    pub caption: String,
    pub alternatives: Vec<String>,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub trends: Vec<String>,
    pub hashtags: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IdeaPrompt {
    pub topic: String,
    pub style: Option<String>,
    pub audience: Option<String>,
    pub platform: String,
}

#[derive(Clone, Default)]
pub struct Assistant {
    model: Option<Arc<dyn ChatModel>>,
}

impl Assistant {
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        Self { model }
    }

    /// Assistant that always answers with fallbacks
    pub fn offline() -> Self {
        Self { model: None }
    }

    pub fn using_ai(&self) -> bool {
        self.model.is_some()
    }

    pub async fn chat(&self, message: &str, context: &str, history: &[HistoryMessage]) -> String {
        let Some(model) = &self.model else {
            let replies = offline_chat_replies(message);
            let pick = rand::rng().random_range(0..replies.len());
            return replies[pick].clone();
        };

        let mut messages = vec![PromptMessage::system(format!(
            "You are an expert TikTok content creator and social media strategist. Help users create engaging, viral-worthy captions and content ideas. Context: {}",
            context
        ))];
        let skip = history.len().saturating_sub(CHAT_HISTORY_WINDOW);
        messages.extend(history.iter().skip(skip).map(|m| match m.sender {
            Sender::User => PromptMessage::user(&m.text),
            Sender::Bot => PromptMessage::assistant(&m.text),
        }));
        messages.push(PromptMessage::user(message));

        let request = CompletionRequest {
            messages,
            max_tokens: 300,
            temperature: 0.7,
        };

        match model.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, model = model.name(), "Chat completion failed, using fallback");
                format!(
                    "I'm having trouble with the AI service right now. Here's a suggestion for \"{}\": Try creating engaging content that asks questions or shows behind-the-scenes moments!",
                    message
                )
            }
        }
    }

    pub async fn draft_caption(
        &self,
        description: &str,
        style: &str,
        include_hashtags: bool,
    ) -> CaptionDraft {
        let Some(model) = &self.model else {
            return CaptionDraft {
                caption: offline_caption(description, style, include_hashtags),
                alternatives: vec![
                    format!("Alternative caption for {}", description),
                    format!("Another creative take on {}", description),
                ],
                hashtags: if include_hashtags {
                    vec!["#ai".into(), "#generated".into(), "#content".into()]
                } else {
                    Vec::new()
                },
            };
        };

        let primary = CompletionRequest {
            messages: vec![
                PromptMessage::system(
                    "You are a TikTok caption expert. Create engaging, platform-appropriate captions.",
                ),
                PromptMessage::user(caption_prompt(description, style, include_hashtags)),
            ],
            max_tokens: 200,
            temperature: 0.8,
        };

        let caption = match model.complete(primary).await {
            Ok(caption) => caption,
            Err(e) => {
                tracing::warn!(error = %e, style, "Caption completion failed, using fallback");
                let caption = format!(
                    "Check out this amazing {}! What do you think? {}",
                    description,
                    if include_hashtags { "#viral #fyp #amazing" } else { "" }
                );
                return CaptionDraft {
                    hashtags: extract_hashtags(&caption),
                    caption,
                    alternatives: Vec::new(),
                };
            }
        };

        let mut alternatives = Vec::new();
        for _ in 0..2 {
            let request = CompletionRequest {
                messages: vec![
                    PromptMessage::system("Create a different TikTok caption variant."),
                    PromptMessage::user(format!(
                        "Create an alternative {} caption for: \"{}\"",
                        style, description
                    )),
                ],
                max_tokens: 150,
                temperature: 0.9,
            };
            match model.complete(request).await {
                Ok(alt) => alternatives.push(alt),
                Err(e) => tracing::warn!(error = %e, "Alternative caption failed"),
            }
        }

        CaptionDraft {
            hashtags: extract_hashtags(&caption),
            caption,
            alternatives,
        }
    }

    pub async fn trends(&self, category: &str) -> TrendReport {
        if let Some(model) = &self.model {
            let request = CompletionRequest {
                messages: vec![
                    PromptMessage::system(
                        "You are a social media trend expert. Provide current trending topics and hashtags.",
                    ),
                    PromptMessage::user(format!(
                        "What are 5 current trending topics, 5 trending hashtags, and 3 content suggestions for {} content on TikTok?",
                        category
                    )),
                ],
                max_tokens: 300,
                temperature: 0.6,
            };

            match model.complete(request).await {
                Ok(text) => {
                    let mut hashtags: Vec<String> =
                        extract_hashtags(&text).into_iter().take(5).collect();
                    if hashtags.is_empty() {
                        hashtags = to_strings(&MODEL_FALLBACK_HASHTAGS);
                    }
                    return TrendReport {
                        trends: to_strings(&MODEL_TRENDS),
                        hashtags,
                        suggestions: to_strings(&MODEL_SUGGESTIONS),
                    };
                }
                Err(e) => tracing::warn!(error = %e, category, "Trend completion failed, using defaults"),
            }
        }

        TrendReport {
            trends: to_strings(&DEFAULT_TRENDS),
            hashtags: to_strings(&DEFAULT_HASHTAGS),
            suggestions: to_strings(&DEFAULT_SUGGESTIONS),
        }
    }

    pub async fn ideas(&self, prompt: &IdeaPrompt) -> Vec<String> {
        let text = match &self.model {
            Some(model) => {
                let seed = format!(
                    "Platform: {}. Audience: {}. Style: {}. Topic: {}.",
                    prompt.platform,
                    prompt.audience.as_deref().unwrap_or("general"),
                    prompt.style.as_deref().unwrap_or("default"),
                    prompt.topic
                );
                let request = CompletionRequest {
                    messages: vec![PromptMessage::user(format!(
                        "Suggest 5 creative short-form content ideas. Each idea must be a single-line, concrete, and include one suggested hashtag.\n{}\nIdeas:",
                        seed
                    ))],
                    max_tokens: 220,
                    temperature: 0.8,
                };
                match model.complete(request).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "Idea completion failed, using fallback");
                        TREND_IDEAS_FALLBACK.to_string()
                    }
                }
            }
            None => TREND_IDEAS_FALLBACK.to_string(),
        };

        extract_list_lines(&text, 5)
    }
}

fn offline_chat_replies(message: &str) -> [String; 4] {
    [
        format!(
            "Great idea! For \"{}\", try adding a hook at the beginning like \"Wait for it...\" or \"You won't believe what happens next!\" 🎬",
            message
        ),
        format!(
            "For content about \"{}\", consider using trending hashtags like #fyp #viral #trending and ask your audience a question to boost engagement! 🚀",
            message
        ),
        format!(
            "Here's a caption idea for \"{}\": Start with an emoji, add intrigue, and end with a call-to-action. Don't forget relevant hashtags! ✨",
            message
        ),
        format!(
            "To make \"{}\" go viral, try the 3-second rule - hook viewers in the first 3 seconds with something unexpected! 🔥",
            message
        ),
    ]
}

fn offline_caption(description: &str, style: &str, include_hashtags: bool) -> String {
    let tags = |t: &'static str| if include_hashtags { t } else { "" };
    match style {
        "viral" => format!(
            "🔥 This {} is about to blow up! Can you guess what happens next? 👀 {}",
            description,
            tags("#viral #trending #fyp")
        ),
        "professional" => format!(
            "Here's an expertly crafted {} that demonstrates best practices. Key takeaways: 📝 {}",
            description,
            tags("#professional #tips #education")
        ),
        "funny" => format!(
            "When you're trying to {} but life has other plans 😂 Can anyone relate? {}",
            description,
            tags("#funny #relatable #comedy")
        ),
        _ => format!(
            "What do you think about this {}? Drop your thoughts below! 💭 Would you try this? {}",
            description,
            tags("#engaging #question #thoughts")
        ),
    }
}

fn caption_prompt(description: &str, style: &str, include_hashtags: bool) -> String {
    let guide = match style {
        "viral" => "Use hooks, trending phrases, create curiosity",
        "engaging" => "Ask questions, be conversational, encourage interaction",
        "professional" => "Be informative, polished, focus on value",
        "funny" => "Use humor, wit, relatable content",
        _ => "",
    };
    let hashtags = if include_hashtags {
        "Include 3-5 relevant hashtags"
    } else {
        "No hashtags needed"
    };
    format!(
        "Create a {style} TikTok caption for: \"{description}\".\nStyle guide:\n- {guide}\n- {hashtags}\n\nFormat: Just return the caption text."
    )
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// All `#word` tokens in order of appearance
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Non-empty lines with list markers stripped, de-duplicated, first `limit`.
pub fn extract_list_lines(text: &str, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let cleaned = line
            .trim()
            .trim_start_matches(|c| LIST_MARKERS.contains(c))
            .trim();
        if cleaned.is_empty() || out.iter().any(|seen| seen == cleaned) {
            continue;
        }
        out.push(cleaned.to_string());
        if out.len() == limit {
            break;
        }
    }
    out
}
