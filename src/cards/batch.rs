use rand::Rng;
use tracing::info;

use crate::{constants::CARD_SETTINGS, error::AppError, shuffle::shuffle};

use super::{
    fill::{FilledCell, fill, required_pool_len},
    layout::GridLayout,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSlot {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub page: usize,
    pub slot: CardSlot,
    pub cells: Vec<FilledCell>,
}

/// Builds `num_cards` cards, two per page, rounding odd counts up.
///
/// Every page reshuffles the whole pool before slicing its two cards, so the
/// same name can land on more than one card in a batch. Nothing here samples
/// without replacement across pages.
pub fn generate<R: Rng + ?Sized>(
    layout: &GridLayout,
    num_cards: usize,
    option_pool: &[String],
    use_free_space: bool,
    title: &str,
    rng: &mut R,
) -> Result<Vec<Card>, AppError> {
    if num_cards < 2 {
        return Err(AppError::validation(format!(
            "at least 2 cards are required, got {num_cards}"
        )));
    }
    if option_pool.len() < CARD_SETTINGS.min_pool {
        return Err(AppError::validation(format!(
            "the option pool needs at least {} names, got {}",
            CARD_SETTINGS.min_pool,
            option_pool.len()
        )));
    }

    let per_card = required_pool_len(&layout.top, layout.columns, false);
    if option_pool.len() < per_card * 2 {
        return Err(AppError::validation(format!(
            "the option pool needs at least {} names to fill a page",
            per_card * 2
        )));
    }

    let num_cards = num_cards + num_cards % 2;
    let mut working: Vec<String> = option_pool.to_vec();
    let mut cards = Vec::with_capacity(num_cards);

    for page in 0..num_cards / 2 {
        working = shuffle(working, rng);
        let (top_pool, rest) = working.split_at(per_card);
        let bottom_pool = &rest[..per_card];

        cards.push(Card {
            page,
            slot: CardSlot::Top,
            cells: fill(&layout.top, title, top_pool, use_free_space),
        });
        cards.push(Card {
            page,
            slot: CardSlot::Bottom,
            cells: fill(&layout.bottom, title, bottom_pool, use_free_space),
        });
    }

    info!(
        cards = cards.len(),
        pool = option_pool.len(),
        use_free_space,
        "generated card batch"
    );
    Ok(cards)
}

pub fn page_count(cards: &[Card]) -> usize {
    cards.iter().map(|card| card.page + 1).max().unwrap_or(0)
}
