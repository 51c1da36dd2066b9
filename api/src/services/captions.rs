//! Caption candidate generation.
//!
//! [`TemplateCaptionSource`] is the placeholder: it shuffles a fixed bank of
//! six templates and decorates three of them with random cosmetic stats.
//! Nothing is derived from the video content.

use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::CAPTION_CANDIDATES;
use crate::models::{CaptionCandidate, CaptionStyle, VideoRecord};

#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    #[error("caption generation failed: {0}")]
    Failed(String),
}

/// Pluggable producer of caption candidates for an uploaded video
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn generate(&self, video: &VideoRecord) -> Result<Vec<CaptionCandidate>, CaptionError>;
}

struct CaptionTemplate {
    base: &'static str,
    hashtags: [&'static str; 5],
    style: CaptionStyle,
}

const TEMPLATES: [CaptionTemplate; 6] = [
    CaptionTemplate {
        base: "🔥 This is absolutely incredible! Can't stop watching this amazing moment",
        hashtags: ["#viral", "#amazing", "#fyp", "#trending", "#wow"],
        style: CaptionStyle::Excitement,
    },
    CaptionTemplate {
        base: "✨ POV: When everything goes perfectly and you can't believe your eyes",
        hashtags: ["#pov", "#perfect", "#satisfying", "#viral", "#mindblown"],
        style: CaptionStyle::Pov,
    },
    CaptionTemplate {
        base: "💫 The way this turned out is just *chef's kiss* - who else is obsessed?",
        hashtags: ["#obsessed", "#perfect", "#viral", "#fyp", "#amazing"],
        style: CaptionStyle::Aesthetic,
    },
    CaptionTemplate {
        base: "🎉 This made my entire day! Share if it made yours too",
        hashtags: ["#wholesome", "#viral", "#happy", "#share", "#positivity"],
        style: CaptionStyle::Wholesome,
    },
    CaptionTemplate {
        base: "🤯 Wait for it... the ending will blow your mind! Trust me on this one",
        hashtags: ["#waitforit", "#mindblowing", "#plottwist", "#viral", "#epic"],
        style: CaptionStyle::Suspense,
    },
    CaptionTemplate {
        base: "😍 This is giving me all the feels! Anyone else crying happy tears?",
        hashtags: ["#feels", "#emotional", "#beautiful", "#viral", "#tears"],
        style: CaptionStyle::Emotional,
    },
];

/// Hashtags appended to the caption text itself
const INLINE_HASHTAGS: usize = 4;

/// Random template-based captions
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCaptionSource;

impl TemplateCaptionSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CaptionSource for TemplateCaptionSource {
    async fn generate(&self, video: &VideoRecord) -> Result<Vec<CaptionCandidate>, CaptionError> {
        tracing::debug!(video_id = %video.id, original_name = %video.original_name, "Picking caption templates");
        Ok(candidates_from(&mut rand::rng()))
    }
}

/// Shuffle the template bank with `rng` and decorate the first three picks.
pub fn candidates_from<R: Rng + ?Sized>(rng: &mut R) -> Vec<CaptionCandidate> {
    let mut bank: Vec<&CaptionTemplate> = TEMPLATES.iter().collect();
    bank.shuffle(rng);

    bank.into_iter()
        .take(CAPTION_CANDIDATES)
        .enumerate()
        .map(|(index, template)| {
            let inline = template.hashtags[..INLINE_HASHTAGS].join(" ");
            CaptionCandidate {
                id: (index + 1).to_string(),
                caption: format!("{} {}", template.base, inline),
                trend: format!(
                    "{} trending +{}%",
                    template.hashtags[0],
                    rng.random_range(50..350)
                ),
                engagement: format!(
                    "{:.1}K likes • {}% engagement",
                    rng.random_range(5.0..25.0),
                    rng.random_range(70..100)
                ),
                confidence: rng.random_range(80..100),
                style: template.style,
                hashtags: template.hashtags.iter().map(|h| h.to_string()).collect(),
            }
        })
        .collect()
}
