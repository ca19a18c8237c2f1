//! Pulls list structures and image sources out of a post body.

use crate::types::ExtractedContent;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// Create static selectors to avoid recompiling them each time
static LIST_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul, ol").expect("Failed to parse list selector")
});

static IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img").expect("Failed to parse img selector")
});

pub fn extract_content(html: &str) -> ExtractedContent {
    let document = Html::parse_fragment(html);

    let detected_lists = document
        .select(&LIST_SELECTOR)
        .map(list_items)
        .filter(|items| !items.is_empty())
        .collect();

    let images = document
        .select(&IMAGE_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect();

    ExtractedContent {
        detected_lists,
        images,
    }
}

/// Trimmed text of each `li` directly under the list.
fn list_items(list: ElementRef<'_>) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(|li| li.text().collect::<String>().trim().to_string())
        .collect()
}
