//! The flip-card interaction driver.
//!
//! Activation is an ordered sequence of two attempts with different input
//! modalities: pointer first, then keyboard. The widget may be bound to
//! either handler, and the test does not need to know which. Each attempt
//! is independently checked by polling for the flipped-state class within
//! the settle budget.

use std::time::Duration;

use anyhow::{Result, anyhow};
use chromiumoxide::page::Page;

use crate::page::wait_for_condition;

/// Selector for the flip-card widget; the first match is driven.
pub const FLIP_CARD_SELECTOR: &str = ".flip-card";

/// Budget for one CSS transition to complete after an activation.
const FLIP_SETTLE: Duration = Duration::from_millis(450);

const FLIPPED_PROBE: &str = r"(function(){
    var card = document.querySelector('.flip-card');
    return !!(card && card.classList.contains('flipped'));
})()";

const FOCUS_CARD: &str = r"(function(){
    var card = document.querySelector('.flip-card');
    if (card) { card.focus(); }
    return !!card;
})()";

/// Flips the first flip-card on the page, falling back from pointer to
/// keyboard activation.
///
/// # Errors
///
/// Returns an error if no flip-card exists, or if the card never gains the
/// `flipped` class after both activation paths ("flip did not occur").
pub async fn flip_card(page: &Page) -> Result<()> {
    let card = page
        .find_element(FLIP_CARD_SELECTOR)
        .await
        .map_err(|err| anyhow!("No {FLIP_CARD_SELECTOR} element on the page: {err}"))?;

    // Primary path: pointer activation.
    card.click().await?;
    if wait_for_condition(page, FLIPPED_PROBE, FLIP_SETTLE).await? {
        return Ok(());
    }

    // Fallback path: keyboard activation on the same element.
    page.evaluate(FOCUS_CARD).await?;
    card.press_key("Enter").await?;
    if wait_for_condition(page, FLIPPED_PROBE, FLIP_SETTLE).await? {
        return Ok(());
    }

    Err(anyhow!(
        "flip did not occur: {FLIP_CARD_SELECTOR} never gained the `flipped` class \
         after pointer and keyboard activation"
    ))
}
