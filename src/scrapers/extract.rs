use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::ExtractedListing;

/// Origin used to absolutize site-relative image links.
pub const SITE_ORIGIN: &str = "https://sn.coinafrique.com";

/// Pull every listing card out of one page of markup.
///
/// Card selection tries the site's current grid class first and falls back
/// to a handful of generic ad-card selectors in case the layout shifts.
/// An empty result is a valid outcome (end of content), not an error.
pub fn extract_listings(html: &str) -> Vec<ExtractedListing> {
    let document = Html::parse_document(html);

    let primary = Selector::parse("div.col.s6.m4.l3").unwrap();
    let fallback = Selector::parse(".listing-item, .ad-card, article, .ad__card").unwrap();

    let mut cards: Vec<ElementRef> = document.select(&primary).collect();
    if cards.is_empty() {
        cards = document.select(&fallback).collect();
    }
    debug!("Found {} listing cards in HTML", cards.len());

    cards.iter().map(|card| extract_card(*card)).collect()
}

/// Extract the fields of a single card. Each field is looked up
/// independently — a missing sub-element yields `None` for that field and
/// never discards the rest of the listing.
fn extract_card(card: ElementRef) -> ExtractedListing {
    let anchor = Selector::parse("a").unwrap();
    let location = Selector::parse("p.ad__card-location span").unwrap();
    let location_fallback = Selector::parse(".location, .ad-location").unwrap();
    let price = Selector::parse("p.ad__card-price").unwrap();
    let price_fallback = Selector::parse(".price, .ad-price").unwrap();
    let image = Selector::parse("img").unwrap();

    // Title: the anchor's title attribute, else its own text.
    let title = card.select(&anchor).next().and_then(|a| {
        match a.value().attr("title") {
            Some(t) if !t.trim().is_empty() => Some(t.trim().to_string()),
            _ => non_empty(a.text().collect::<String>()),
        }
    });

    let location = select_text(card, &location).or_else(|| select_text(card, &location_fallback));
    let price_text = select_text(card, &price).or_else(|| select_text(card, &price_fallback));

    let image_url = card.select(&image).next().and_then(|img| {
        let src = img
            .value()
            .attr("src")
            .filter(|s| !s.is_empty())
            .or_else(|| img.value().attr("data-src"));
        src.and_then(resolve_image_url)
    });

    ExtractedListing {
        title,
        location,
        price_text,
        image_url,
    }
}

/// Resolve a scraped image link to an absolute URL:
/// protocol-relative (`//...`) gets `https:`, site-relative (`/...`) gets
/// the site origin, anything else is already absolute.
pub fn resolve_image_url(src: &str) -> Option<String> {
    if src.is_empty() {
        None
    } else if let Some(rest) = src.strip_prefix("//") {
        Some(format!("https://{rest}"))
    } else if src.starts_with('/') {
        Some(format!("{SITE_ORIGIN}{src}"))
    } else {
        Some(src.to_string())
    }
}

fn select_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|el| non_empty(el.text().collect::<String>()))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="col s6 m4 l3">
            <a href="/annonce/123" title="Berger allemand 3 mois">Berger allemand</a>
            <p class="ad__card-location"><span>Dakar, Grand Yoff</span></p>
            <p class="ad__card-price">150 000 CFA</p>
            <img src="//images.coinafrique.com/berger.jpg">
          </div>
          <div class="col s6 m4 l3">
            <a href="/annonce/124">Mouton ladoum</a>
            <img data-src="/media/mouton.jpg">
          </div>
        </body></html>
    "#;

    #[test]
    fn extracts_fields_from_full_card() {
        let listings = extract_listings(PAGE);
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.title.as_deref(), Some("Berger allemand 3 mois"));
        assert_eq!(first.location.as_deref(), Some("Dakar, Grand Yoff"));
        assert_eq!(first.price_text.as_deref(), Some("150 000 CFA"));
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://images.coinafrique.com/berger.jpg")
        );
    }

    #[test]
    fn missing_subelements_yield_none_without_discarding_the_rest() {
        let listings = extract_listings(PAGE);
        let second = &listings[1];

        // No title attribute: falls back to the anchor text.
        assert_eq!(second.title.as_deref(), Some("Mouton ladoum"));
        assert_eq!(second.location, None);
        assert_eq!(second.price_text, None);
        // Lazy-load attribute, site-relative path.
        assert_eq!(
            second.image_url.as_deref(),
            Some("https://sn.coinafrique.com/media/mouton.jpg")
        );
    }

    #[test]
    fn falls_back_to_generic_card_selectors() {
        let html = r#"
            <html><body>
              <article>
                <a title="Lapin nain">voir</a>
                <span class="ad-location">Thiès</span>
                <span class="ad-price">5 000 CFA</span>
              </article>
            </body></html>
        "#;
        let listings = extract_listings(html);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title.as_deref(), Some("Lapin nain"));
        assert_eq!(listings[0].location.as_deref(), Some("Thiès"));
        assert_eq!(listings[0].price_text.as_deref(), Some("5 000 CFA"));
    }

    #[test]
    fn page_without_cards_yields_empty_set() {
        assert!(extract_listings("<html><body><p>rien</p></body></html>").is_empty());
    }

    #[test]
    fn image_urls_are_absolutized() {
        assert_eq!(
            resolve_image_url("//host/path.jpg").as_deref(),
            Some("https://host/path.jpg")
        );
        assert_eq!(
            resolve_image_url("/path.jpg").as_deref(),
            Some("https://sn.coinafrique.com/path.jpg")
        );
        assert_eq!(
            resolve_image_url("https://cdn.example.com/a.jpg").as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(resolve_image_url(""), None);
    }
}
