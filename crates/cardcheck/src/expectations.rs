//! Status-derived front-face expectations.

use anyhow::{Result, anyhow};
use catalog_harness::status::Status;
use chromiumoxide::page::Page;
use serde::Deserialize;

use crate::flip::FLIP_CARD_SELECTOR;
use crate::page::eval_bool;

/// Inert placeholder destination a purchase action must not carry.
pub const PLACEHOLDER_HREF: &str = "#";

/// Asserts the front face matches the unit's resolved status.
///
/// Both branches also require the flip-card itself to be visible.
///
/// # Errors
///
/// Returns an error describing the first violated expectation.
pub async fn assert_front_state(page: &Page, status: Status) -> Result<()> {
    if !eval_bool(page, CARD_VISIBLE_PROBE).await? {
        return Err(anyhow!("No visible {FLIP_CARD_SELECTOR} element on the page"));
    }
    match status {
        Status::Sold => assert_sold_front(page).await,
        Status::Available => assert_available_front(page).await,
    }
}

/// Sold front: a sold marker must be visible and no purchase-action element
/// may exist anywhere in the document.
///
/// Several alternative marker selectors are accepted; any one satisfies the
/// assertion. Catalog pages have shipped more than one sold markup variant,
/// so the tolerance is kept rather than collapsing to one selector.
async fn assert_sold_front(page: &Page) -> Result<()> {
    let state: SoldFrontState = page.evaluate(SOLD_STATE_PROBE).await?.into_value()?;

    if !state.sold_visible {
        return Err(anyhow!(
            "Sold unit is missing a visible sold marker (looked for any of: {})",
            SOLD_MARKER_SELECTORS.join(", ")
        ));
    }
    if state.buy_count > 0 {
        return Err(anyhow!(
            "Sold unit still has {} purchase-action element(s) in the document",
            state.buy_count
        ));
    }
    Ok(())
}

/// Available front: a visible purchase action carrying a real destination.
async fn assert_available_front(page: &Page) -> Result<()> {
    let state: BuyButtonState = page.evaluate(BUY_BUTTON_PROBE).await?.into_value()?;

    if !state.present {
        return Err(anyhow!("Available unit has no purchase-action element"));
    }
    if !state.visible {
        return Err(anyhow!("Purchase action exists but is not visible"));
    }
    match state.href.as_deref() {
        None => Err(anyhow!("Purchase action has no destination attribute")),
        Some("") => Err(anyhow!("Purchase action destination is empty")),
        Some(PLACEHOLDER_HREF) => Err(anyhow!(
            "Purchase action destination is the inert placeholder \"{PLACEHOLDER_HREF}\""
        )),
        Some(_) => Ok(()),
    }
}

/// The alternative markup variants a sold marker may use.
pub const SOLD_MARKER_SELECTORS: &[&str] = &[".sold-badge", ".sold-ribbon", "[data-sold=\"true\"]"];

#[derive(Deserialize)]
struct SoldFrontState {
    #[serde(rename = "soldVisible")]
    sold_visible: bool,
    #[serde(rename = "buyCount")]
    buy_count: u32,
}

#[derive(Deserialize)]
struct BuyButtonState {
    present: bool,
    visible: bool,
    href: Option<String>,
}

const CARD_VISIBLE_PROBE: &str = r"(function(){
    var card = document.querySelector('.flip-card');
    return !!(card && (card.offsetWidth || card.offsetHeight || card.getClientRects().length));
})()";

const SOLD_STATE_PROBE: &str = r#"(function(){
    var markers = ['.sold-badge', '.sold-ribbon', '[data-sold="true"]'];
    var visible = function(el){
        return !!(el && (el.offsetWidth || el.offsetHeight || el.getClientRects().length));
    };
    var soldVisible = markers.some(function(sel){
        return Array.from(document.querySelectorAll(sel)).some(visible);
    });
    return {
        soldVisible: soldVisible,
        buyCount: document.querySelectorAll('.buy-button').length
    };
})()"#;

const BUY_BUTTON_PROBE: &str = r"(function(){
    var el = document.querySelector('.buy-button');
    var visible = !!(el && (el.offsetWidth || el.offsetHeight || el.getClientRects().length));
    return {
        present: !!el,
        visible: visible,
        href: el ? el.getAttribute('href') : null
    };
})()";
