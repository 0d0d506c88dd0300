//! Flyer parameter vocabulary.
//!
//! Every enum here has a stable wire token (its serde rename) that is also
//! what gets stored in the database. Parsing goes through [`FromStr`] so
//! handlers can turn a bad token into a validation error instead of a
//! deserialization failure.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------- Listing type ----------

/// The banner headline of the flyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    #[serde(rename = "FOR SALE")]
    ForSale,
    #[serde(rename = "FOR LEASE")]
    ForLease,
    #[serde(rename = "SOLD")]
    Sold,
    #[serde(rename = "OPEN HOUSE")]
    OpenHouse,
    #[serde(rename = "COMING SOON")]
    ComingSoon,
    #[serde(rename = "PRICE REDUCTION")]
    PriceReduction,
}

impl ListingType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::ForSale => "FOR SALE",
            ListingType::ForLease => "FOR LEASE",
            ListingType::Sold => "SOLD",
            ListingType::OpenHouse => "OPEN HOUSE",
            ListingType::ComingSoon => "COMING SOON",
            ListingType::PriceReduction => "PRICE REDUCTION",
        }
    }
}

impl FromStr for ListingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FOR SALE" => Ok(ListingType::ForSale),
            "FOR LEASE" => Ok(ListingType::ForLease),
            "SOLD" => Ok(ListingType::Sold),
            "OPEN HOUSE" => Ok(ListingType::OpenHouse),
            "COMING SOON" => Ok(ListingType::ComingSoon),
            "PRICE REDUCTION" => Ok(ListingType::PriceReduction),
            other => Err(CoreError::Validation(format!(
                "Invalid listing type '{other}'"
            ))),
        }
    }
}

// ---------- Color scheme ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Navy,
    Black,
    Green,
    Burgundy,
    Charcoal,
    Purple,
    Taupe,
    Teal,
    /// Caller supplies a hex code alongside this variant.
    Custom,
}

impl ColorScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Navy => "navy",
            ColorScheme::Black => "black",
            ColorScheme::Green => "green",
            ColorScheme::Burgundy => "burgundy",
            ColorScheme::Charcoal => "charcoal",
            ColorScheme::Purple => "purple",
            ColorScheme::Taupe => "taupe",
            ColorScheme::Teal => "teal",
            ColorScheme::Custom => "custom",
        }
    }
}

impl FromStr for ColorScheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navy" => Ok(ColorScheme::Navy),
            "black" => Ok(ColorScheme::Black),
            "green" => Ok(ColorScheme::Green),
            "burgundy" => Ok(ColorScheme::Burgundy),
            "charcoal" => Ok(ColorScheme::Charcoal),
            "purple" => Ok(ColorScheme::Purple),
            "taupe" => Ok(ColorScheme::Taupe),
            "teal" => Ok(ColorScheme::Teal),
            "custom" => Ok(ColorScheme::Custom),
            other => Err(CoreError::Validation(format!(
                "Invalid color scheme '{other}'"
            ))),
        }
    }
}

// ---------- Style ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlyerStyle {
    Modern,
    Luxury,
    Minimalist,
    Classic,
}

impl FlyerStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FlyerStyle::Modern => "modern",
            FlyerStyle::Luxury => "luxury",
            FlyerStyle::Minimalist => "minimalist",
            FlyerStyle::Classic => "classic",
        }
    }
}

impl FromStr for FlyerStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modern" => Ok(FlyerStyle::Modern),
            "luxury" => Ok(FlyerStyle::Luxury),
            "minimalist" => Ok(FlyerStyle::Minimalist),
            "classic" => Ok(FlyerStyle::Classic),
            other => Err(CoreError::Validation(format!("Invalid style '{other}'"))),
        }
    }
}

// ---------- Aspect ratio ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "4:5")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Story => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "4:5",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1:1" => Ok(AspectRatio::Square),
            "9:16" => Ok(AspectRatio::Story),
            "16:9" => Ok(AspectRatio::Landscape),
            "4:5" => Ok(AspectRatio::Portrait),
            other => Err(CoreError::Validation(format!(
                "Invalid aspect ratio '{other}'. Must be one of: 1:1, 9:16, 16:9, 4:5"
            ))),
        }
    }
}

// ---------- Parameter set ----------

/// Everything the prompt compiler needs, minus the image payloads.
///
/// This struct is serialized verbatim as the `params` snapshot stored next
/// to each generated flyer, so regeneration and auditing see exactly what
/// the generation used. Prices are display strings, not numbers; whatever
/// the agent typed is what the flyer shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyerParams {
    pub listing_type: ListingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub agent_name: String,
    pub agent_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_company: Option<String>,
    pub color_scheme: ColorScheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_hex: Option<String>,
    pub style: FlyerStyle,
    pub aspect_ratio: AspectRatio,
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Wire tokens --

    #[test]
    fn listing_type_uses_banner_text_as_token() {
        let json = serde_json::to_string(&ListingType::OpenHouse).unwrap();
        assert_eq!(json, "\"OPEN HOUSE\"");
        assert_eq!(
            "PRICE REDUCTION".parse::<ListingType>().unwrap(),
            ListingType::PriceReduction
        );
    }

    #[test]
    fn aspect_ratio_tokens_round_trip() {
        for ratio in [
            AspectRatio::Square,
            AspectRatio::Story,
            AspectRatio::Landscape,
            AspectRatio::Portrait,
        ] {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), ratio);
            let json = serde_json::to_string(&ratio).unwrap();
            assert_eq!(json, format!("\"{}\"", ratio.as_str()));
        }
    }

    #[test]
    fn invalid_tokens_are_validation_errors() {
        assert!(matches!(
            "RENTED".parse::<ListingType>(),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            "neon".parse::<ColorScheme>(),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            "3:2".parse::<AspectRatio>(),
            Err(CoreError::Validation(_))
        ));
    }

    // -- Snapshot shape --

    #[test]
    fn params_snapshot_is_camel_case_and_omits_empty_options() {
        let params = FlyerParams {
            listing_type: ListingType::ForSale,
            price: Some("$500,000".into()),
            original_price: None,
            bedrooms: 3,
            bathrooms: 2.5,
            square_feet: None,
            property_address: None,
            description: None,
            agent_name: "Jane Smith".into(),
            agent_phone: "555-0100".into(),
            agent_company: None,
            color_scheme: ColorScheme::Navy,
            custom_hex: None,
            style: FlyerStyle::Modern,
            aspect_ratio: AspectRatio::Square,
        };

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["listingType"], "FOR SALE");
        assert_eq!(value["agentName"], "Jane Smith");
        assert_eq!(value["colorScheme"], "navy");
        assert!(value.get("originalPrice").is_none());
        assert!(value.get("squareFeet").is_none());

        let back: FlyerParams = serde_json::from_value(value).unwrap();
        assert_eq!(back, params);
    }
}
