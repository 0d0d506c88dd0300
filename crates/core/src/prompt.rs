//! Prompt compilation.
//!
//! Turns a [`FlyerParams`] set plus ordered image references into the
//! provider request: one instruction text and the attachment list. The
//! output is a pure function of its inputs so repeated calls with the same
//! project state produce identical requests.
//!
//! Layout policy is driven by how many property photos exist: zero gets a
//! text-focused generic design (the model is told not to invent a house
//! photo), one gets a hero feature, two a split view, three a trio grid,
//! four or more a gallery grid. The first property image is always the
//! hero. The agent portrait, when present, is the final attachment.

use crate::flyer::{ColorScheme, FlyerParams, FlyerStyle, ListingType};
use crate::image_ref::ImageRef;

/// A fully compiled provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPrompt {
    pub instruction: String,
    /// Property images in upload order, then the agent portrait last.
    pub attachments: Vec<ImageRef>,
}

/// Compile the generation request for one flyer.
pub fn compile(
    params: &FlyerParams,
    property_images: &[ImageRef],
    agent_portrait: Option<&ImageRef>,
) -> CompiledPrompt {
    let image_count = property_images.len();
    let mut text = String::new();

    text.push_str("Design a professional real estate social media flyer.\n\n");
    text.push_str(&format!("PROPERTY IMAGES PROVIDED: {image_count}\n"));
    text.push_str(&layout_instructions(image_count));

    text.push_str("\nAGENT INFORMATION:\n");
    if agent_portrait.is_some() {
        text.push_str(
            "Agent portrait photo is provided - include in top-right corner or bottom section clearly.\n",
        );
    } else {
        text.push_str("No agent photo provided.\n");
    }
    text.push_str(&format!("- Agent: \"{}\"\n", params.agent_name));
    if !params.agent_phone.is_empty() {
        text.push_str(&format!("- Phone: \"{}\"\n", params.agent_phone));
    }
    if let Some(company) = params.agent_company.as_deref().filter(|c| !c.is_empty()) {
        text.push_str(&format!("- Company: \"{company}\"\n"));
    }

    text.push_str("\nPROPERTY DETAILS:\n");
    text.push_str(&format!(
        "- Listing Type: \"{}\"\n",
        params.listing_type.as_str()
    ));
    text.push_str(&format!("- Price: {}\n", price_block(params)));
    text.push_str(&format!(
        "- \"{} Bedrooms / {} Bathrooms\"\n",
        params.bedrooms, params.bathrooms
    ));
    if let Some(square_feet) = params.square_feet {
        text.push_str(&format!(
            "- \"{} sq ft\"\n",
            format_thousands(square_feet)
        ));
    }
    if let Some(description) = params.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!("- \"{description}\"\n"));
    }
    if let Some(address) = params.property_address.as_deref().filter(|a| !a.is_empty()) {
        text.push_str(&format!("- Address: \"{address}\"\n"));
    }

    text.push_str("\nDESIGN RULES:\n");
    text.push_str(&format!("- Color scheme: {}\n", palette_description(params)));
    text.push_str(&format!("- Style: {}\n", style_description(params.style)));
    text.push_str(&format!("- Aspect Ratio: {}\n", params.aspect_ratio.as_str()));
    text.push_str("- Clean alignment and spacing\n");
    text.push_str("- All text must be crisp and legible\n");
    text.push_str("- Professional, marketing-ready social media design\n");

    text.push_str("\nCRITICAL RULES:\n");
    text.push_str("- All user-provided images must appear exactly as uploaded\n");
    text.push_str("- Preserve original aspect ratios\n");
    text.push_str("- Do NOT distort, crop, or modify user photos\n");
    text.push_str("- Simply integrate them into your layout\n");
    text.push_str("- Designate the first image as the Hero image.\n");

    text.push_str("\nGenerate the final flyer image.");

    let mut attachments: Vec<ImageRef> = property_images.to_vec();
    if let Some(portrait) = agent_portrait {
        attachments.push(portrait.clone());
    }

    CompiledPrompt {
        instruction: text,
        attachments,
    }
}

/// Group digits of a non-negative quantity with comma separators.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

// ---------- private helpers ----------

fn layout_instructions(image_count: usize) -> String {
    match image_count {
        0 => "[LAYOUT: GENERIC STOCK]\n\
              No property images provided. Create a high-quality \"Coming Soon\" or generic real estate flyer style.\n\
              - Use generic, modern, abstract real estate background shapes or patterns.\n\
              - DO NOT hallucinate a specific house photo.\n\
              - Focus on typography and the text information.\n\
              - Center the Agent's information if provided.\n"
            .to_string(),
        1 => "[LAYOUT: HERO FEATURE]\n\
              The user has provided EXACTLY 1 property photo.\n\
              - Use this single image as the main Hero background or central feature.\n\
              - Do NOT shrink the image unnecessarily.\n\
              - Do NOT duplicate the image to fill space.\n\
              - Overlay text stylishly or place text in a solid panel below/overlaying the image.\n"
            .to_string(),
        2 => "[LAYOUT: SPLIT VIEW]\n\
              The user has provided EXACTLY 2 property photos.\n\
              - Layout: 50/50 Split (Horizontal Top/Bottom OR Vertical Left/Right).\n\
              - Top/Left: Image 1\n\
              - Bottom/Right: Image 2\n\
              - CRITICAL: Do NOT duplicate either image. Use each image exactly once.\n\
              - CRITICAL: Do NOT crop important features.\n"
            .to_string(),
        3 => "[LAYOUT: TRIO GRID]\n\
              The user has provided EXACTLY 3 property photos.\n\
              - Image 1 (Hero): Takes up the top 50-60% of the flyer.\n\
              - Image 2 & 3: Placed side-by-side in the bottom section.\n\
              - CRITICAL: Use each image exactly once. Do not repeat images.\n"
            .to_string(),
        n => format!(
            "[LAYOUT: GALLERY GRID]\n\
             The user has provided {n} property photos.\n\
             - Image 1 (Hero): Large feature image (top 50%).\n\
             - Remaining images: Arrange in a neat grid or strip below the hero image.\n\
             - CRITICAL: Use each image exactly once. Do not repeat images.\n"
        ),
    }
}

fn price_block(params: &FlyerParams) -> String {
    let price = params.price.as_deref().unwrap_or("0");
    match (params.listing_type, params.original_price.as_deref()) {
        (ListingType::PriceReduction, Some(original)) if !original.is_empty() => format!(
            "Show original price \"${original}\" with a strikethrough, then new price \"${price}\" larger below"
        ),
        _ => format!("Display the price \"${price}\" prominently"),
    }
}

fn palette_description(params: &FlyerParams) -> String {
    if params.color_scheme == ColorScheme::Custom {
        if let Some(hex) = params.custom_hex.as_deref().filter(|h| !h.is_empty()) {
            return format!(
                "custom color scheme matching hex code {hex} with complementary text color"
            );
        }
    }
    let scheme = match params.color_scheme {
        ColorScheme::Navy | ColorScheme::Custom => {
            "deep navy blue with white text and gold accents"
        }
        ColorScheme::Black => "elegant black with white text and silver accents",
        ColorScheme::Green => "forest green with cream text and gold accents",
        ColorScheme::Burgundy => "rich burgundy with ivory text and gold accents",
        ColorScheme::Charcoal => "modern charcoal grey with white text and silver accents",
        ColorScheme::Purple => "regal royal purple with white text and gold accents",
        ColorScheme::Taupe => "warm brownish taupe earth tone with dark brown text",
        ColorScheme::Teal => "deep modern teal with white text and gold accents",
    };
    scheme.to_string()
}

fn style_description(style: FlyerStyle) -> &'static str {
    match style {
        FlyerStyle::Modern => "clean modern layout, sans-serif fonts, lots of white space",
        FlyerStyle::Luxury => "premium luxury design, elegant serif fonts, subtle gradients",
        FlyerStyle::Minimalist => "minimalist layout, very clean, thin typography",
        FlyerStyle::Classic => "classic professional real estate layout, balanced typography",
    }
}
