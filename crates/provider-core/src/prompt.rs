//! Generation prompt construction.
//!
//! Renders the product submission into the full text prompt sent to a
//! provider. Concepts and audiences the service knows about get stock
//! phrasing; free-text values pass through.

/// Input for building a generation prompt.
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub name: &'a str,
    pub features: &'a str,
    pub concept: &'a str,
    pub target_audience: &'a str,
    pub image_url: Option<&'a str>,
}

fn concept_description(concept: &str) -> String {
    match concept {
        "unboxing" => "An exciting unboxing scene that draws the eye to the product".to_string(),
        "lifestyle" => {
            "The product in real everyday use, showing its convenience and benefits".to_string()
        }
        "closeup" => {
            "Slow rotating close-up shots highlighting material detail and premium finish"
                .to_string()
        }
        "before_after" => {
            "A before-and-after comparison making the result of using the product obvious"
                .to_string()
        }
        "demo" => "A simple, quick-to-grasp demonstration of how the product is used".to_string(),
        other => format!("Present the product with this concept: {}", other),
    }
}

fn audience_description(audience: &str) -> String {
    match audience {
        "gen_z" => "Aimed at a Gen Z audience: fun, current, trend-aware".to_string(),
        "millennials" => {
            "Aimed at millennials who value quality and getting their money's worth".to_string()
        }
        "parents" => "Aimed at parents who care about safety and quality".to_string(),
        "professionals" => {
            "Aimed at working professionals who want convenience and a polished look".to_string()
        }
        "beauty" => "Aimed at a beauty-focused audience that loves self-care".to_string(),
        other => format!("Aimed at this target audience: {}", other),
    }
}

/// Build the full generation prompt for a product video.
///
/// The output targets an 8-second 9:16 short-form clip and embeds the
/// content rules the providers are expected to honor.
pub fn build_video_prompt(input: &PromptInput<'_>) -> String {
    let concept = concept_description(input.concept);
    let audience = audience_description(input.target_audience);
    let reference = input.image_url.unwrap_or("");

    format!(
        "Create a 9:16 product video of about 8 seconds, in the style of \
short-form social clips, with realistic, attention-grabbing visuals from the \
first moment.\n\
Video details:\n\
- {concept}\n\
- Product: {name}\n\
- Key features: {features}\n\
- {audience}\n\
- Tone: modern, bright, approachable\n\
- Camera movement: smooth and engaging\n\
- Reference image, use it if provided:\n\
{reference}\n\
Output format:\n\
- High quality 1080x1920 video\n\
- 8 seconds long\n\
- Ready to post on short-form video platforms\n\
Content rules:\n\
1. No profanity or inappropriate language\n\
2. No offensive or indecent content\n\
3. Keep the tone polite and friendly\n\
4. No adult content\n\
5. Do not burn subtitles into the video\n\
6. If narration is needed, use voice and scene description only, never \
on-screen text",
        concept = concept,
        name = input.name,
        features = input.features,
        audience = audience,
        reference = reference,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_product_fields() {
        let prompt = build_video_prompt(&PromptInput {
            name: "Thermal Mug",
            features: "Keeps drinks hot for 12 hours",
            concept: "closeup",
            target_audience: "professionals",
            image_url: Some("https://cdn.example/mug.jpg"),
        });

        assert!(prompt.contains("Thermal Mug"));
        assert!(prompt.contains("Keeps drinks hot for 12 hours"));
        assert!(prompt.contains("close-up"));
        assert!(prompt.contains("https://cdn.example/mug.jpg"));
    }

    #[test]
    fn test_unknown_concept_passes_through() {
        let prompt = build_video_prompt(&PromptInput {
            name: "Lamp",
            features: "Dimmable",
            concept: "cinematic noir",
            target_audience: "gen_z",
            image_url: None,
        });

        assert!(prompt.contains("cinematic noir"));
        assert!(prompt.contains("Gen Z"));
    }
}
