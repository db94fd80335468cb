use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CARD_EXPIRY_PATTERN, CARD_NUMBER_PATTERN},
    types::{CardId, ValueError},
};

lazy_static! {
    static ref CARD_NUMBER_REGEX: Regex =
        Regex::new(CARD_NUMBER_PATTERN).expect("Failed to compile card number regex");
    static ref CARD_EXPIRY_REGEX: Regex =
        Regex::new(CARD_EXPIRY_PATTERN).expect("Failed to compile card expiry regex");
}

/// Templates offered when adding a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CardTemplate {
    #[default]
    Classic,
    Gold,
    Platinum,
    Business,
}

impl CardTemplate {
    pub fn bank(&self) -> &'static str {
        match self {
            CardTemplate::Classic | CardTemplate::Gold => "Demo Bank",
            CardTemplate::Platinum => "Demo Bank Private",
            CardTemplate::Business => "Demo Bank Business",
        }
    }

    pub fn style(&self) -> CardStyle {
        match self {
            CardTemplate::Classic => CardStyle::Blue,
            CardTemplate::Gold => CardStyle::Gold,
            CardTemplate::Platinum => CardStyle::Silver,
            CardTemplate::Business => CardStyle::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    Blue,
    Gold,
    Silver,
    Black,
}

/// A payment card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Masked card number, e.g. `**** **** **** 1234`
    pub number: String,
    /// Expiry as `MM/YY`
    pub expiry: String,
    pub bank: String,
    pub style: CardStyle,
}

/// Card creation request, validated by [`NewCard::new`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub template: CardTemplate,
    number: String,
    expiry: String,
}

impl NewCard {
    pub fn new(template: CardTemplate, number: &str, expiry: &str) -> Result<Self, ValueError> {
        let number = number.trim();
        if !CARD_NUMBER_REGEX.is_match(number) {
            return Err(ValueError::CardNumber);
        }
        let expiry = expiry.trim();
        if !CARD_EXPIRY_REGEX.is_match(expiry) {
            return Err(ValueError::CardExpiry);
        }
        Ok(Self {
            template,
            number: number.chars().filter(|c| c.is_ascii_digit()).collect(),
            expiry: expiry.to_string(),
        })
    }

    /// Build the stored card; the full number never leaves this function
    pub fn into_card(self, id: CardId) -> Card {
        Card {
            id,
            number: mask_card_number(&self.number),
            expiry: self.expiry,
            bank: self.template.bank().to_string(),
            style: self.template.style(),
        }
    }
}

pub fn mask_card_number(digits: &str) -> String {
    let last4: String = digits
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("**** **** **** {}", last4)
}
