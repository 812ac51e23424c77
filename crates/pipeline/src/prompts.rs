//! Prompt templates sent to the text and vision model.
//!
//! Each prompt pins the exact JSON shape the matching stage parses.

use adapt_core::analysis::{StyleAnalysis, UspAnalysis};

pub fn usp_prompt(product_text: &str) -> String {
    format!(
        r#"Analyze the following product description and extract:
1. Unique Selling Propositions (USPs): What makes this product unique or better than competitors?
2. Potential emotional triggers: What emotions does this product evoke in customers?

Base the analysis only on the text below. Do not invent features that are not mentioned.

Provide your response as a JSON object with exactly two keys:
- "usps": An array of up to 5 strings, each describing a USP
- "emotions": An array of up to 5 strings, each describing an emotional trigger

Product description: {product_text}

Respond only with valid JSON, no other text."#
    )
}

pub const STYLE_PROMPT: &str = r#"Analyze these brand images and logos to extract the overall style and aesthetic.

Provide a comprehensive analysis including:
1. Dominant colors: Identify the top 5 most prominent colors with their hex codes and descriptive names
2. Font style: What type of fonts are used (e.g., serif, sans-serif, modern, etc.)
3. Tone of voice: What tone does the brand convey (e.g., professional, playful, luxurious)
4. Overall aesthetic: General description of the visual style

Output your response as a JSON object with exactly these keys:
- "dominant_colors": Array of objects, each with "hex_code" and "name"
- "font_style": String describing the font characteristics
- "tone_of_voice": String describing the brand tone
- "aesthetic": String describing the overall visual style

Keep each string description to 50 words or less.

Do not include any text outside the JSON."#;

pub fn brief_prompt(
    usp: &UspAnalysis,
    style: &StyleAnalysis,
    campaign_id: &str,
    product_id: &str,
) -> String {
    let usp_json = serde_json::to_string_pretty(usp).unwrap_or_default();
    let style_json = serde_json::to_string_pretty(style).unwrap_or_default();

    format!(
        r#"As a creative director, create a compelling ad brief for a video advertisement.
Use only the information in the analyses below. Do not add new concepts, features or claims.

USP & Emotion Analysis:
{usp_json}

Brand Style Analysis:
{style_json}

Campaign ID: {campaign_id}
Product ID: {product_id}

Generate the ad brief following this exact JSON structure:

{{
  "campaignId": "{campaign_id}",
  "productId": "{product_id}",
  "metadata": {{
    "version": "1.0",
    "createdAt": null,
    "approvedBy": null
  }},
  "creativeConcept": {{
    "hook": "A compelling opening hook",
    "coreMessage": "The main message about the product benefits",
    "callToAction": {{
      "text": "Action-oriented CTA text",
      "url": "https://example.com/product"
    }}
  }},
  "script": [
    {{
      "scene": 1,
      "duration_seconds": 3,
      "visuals": "Description of visuals",
      "voiceover": "Voiceover text for this scene"
    }}
  ],
  "styleGuidance": {{
    "tone": "Emotional tone from analysis",
    "dominantColors": ["array of hex codes from style analysis"],
    "fontStyle": "Font style description from analysis"
  }}
}}

Fill in all fields appropriately based on the input analyses.
- Make the hook engaging and relevant to the USPs
- The script should have 2-4 scenes, each 2-4 seconds long, numbered from 1
- Use the emotions and tone of voice in creative decisions
- Output only the JSON, no other text."#
    )
}
