// 🖼️ Presentation - HTML pages and labels built from query results
// The core hands over plain data; everything user-visible is produced here

use crate::advice::Advice;
use crate::catalogue::{Catalogue, Category, Item};
use crate::query::{category_counts, confusing_items, query, CategoryCounts, CategoryKey};

pub const APP_NAME: &str = "WasteWise";

pub const LIST_LOAD_ERROR: &str = "Could not load items list.";
pub const ITEM_LOAD_ERROR: &str = "Could not load items.json";
pub const NOT_FOUND_TITLE: &str = "Item not found";
pub const NOT_FOUND_MESSAGE: &str = "Sorry, we couldn’t find that item.";
pub const BACK_TO_SEARCH: &str = "← Back to Search";

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// "1 item", "3 items"
pub fn count_label(count: usize) -> String {
    format!("{} item{}", count, if count == 1 { "" } else { "s" })
}

/// Short label for a category tab
pub fn tab_label(key: &CategoryKey) -> &str {
    match key {
        CategoryKey::All => "All",
        CategoryKey::Only(Category::Wet) => "Wet",
        CategoryKey::Only(Category::DryRecyclable) => "Dry ♻️",
        CategoryKey::Only(Category::DryNonRecyclable) => "Dry (non)",
        CategoryKey::Only(Category::EWaste) => "E‑waste",
        CategoryKey::Only(Category::Biomedical) => "Biomedical",
        CategoryKey::Only(Category::Other(raw)) => raw.as_str(),
    }
}

/// Browser title of a detail page
pub fn item_title(item: &Item) -> String {
    format!("{} — {}", APP_NAME, item.name)
}

/// Link to the detail view of an item
pub fn item_href(id: i64) -> String {
    format!("/item?id={}", id)
}

fn list_href(search: &str, key: &CategoryKey) -> String {
    if search.is_empty() {
        format!("/?category={}", urlencoding::encode(key.as_str()))
    } else {
        format!(
            "/?q={}&category={}",
            urlencoding::encode(search),
            urlencoding::encode(key.as_str())
        )
    }
}

// ============================================================================
// LIST VIEW
// ============================================================================

/// Everything the list view shows, computed from one catalogue snapshot
#[derive(Debug, Clone)]
pub struct ListView<'a> {
    pub search: String,
    pub key: CategoryKey,
    pub counts: CategoryCounts,
    pub confusing: Vec<&'a Item>,
    pub results: Vec<&'a Item>,
}

impl<'a> ListView<'a> {
    pub fn build(catalogue: &'a Catalogue, search: &str, key: CategoryKey) -> Self {
        ListView {
            search: search.to_string(),
            counts: category_counts(catalogue),
            confusing: confusing_items(catalogue),
            results: query(catalogue, search, &key),
            key,
        }
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n\
         <body>\n<header><a class=\"brand\" href=\"/\">{}</a></header>\n<main>\n{}\n</main>\n\
         </body>\n</html>\n",
        escape_html(title),
        APP_NAME,
        body
    )
}

fn search_form(search: &str, key: &CategoryKey) -> String {
    format!(
        "<form class=\"search\" method=\"get\" action=\"/\">\
         <input id=\"search\" type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search items (e.g. pizza box)\">\
         <input type=\"hidden\" name=\"category\" value=\"{}\">\
         <button type=\"submit\">Search</button></form>",
        escape_html(search),
        escape_html(key.as_str())
    )
}

fn section_tabs(view: &ListView) -> String {
    let buttons: Vec<String> = view
        .counts
        .entries()
        .iter()
        .map(|(key, count)| {
            let class = if *key == view.key { "stab active" } else { "stab" };
            format!(
                "<a class=\"{}\" data-key=\"{}\" href=\"{}\">{} ({})</a>",
                class,
                escape_html(key.as_str()),
                escape_html(&list_href(&view.search, key)),
                escape_html(tab_label(key)),
                count
            )
        })
        .collect();

    format!("<nav id=\"section-tabs\">{}</nav>", buttons.join(""))
}

fn confusing_chips(items: &[&Item]) -> String {
    let chips: Vec<String> = items
        .iter()
        .map(|it| {
            format!(
                "<a class=\"chip\" data-id=\"{}\" href=\"{}\">{}</a>",
                it.id,
                item_href(it.id),
                escape_html(&it.name)
            )
        })
        .collect();

    format!(
        "<section id=\"confusing\"><h2>Commonly confusing</h2><div id=\"confusing-chips\">{}</div></section>",
        chips.join("")
    )
}

fn result_card(item: &Item) -> String {
    let category = escape_html(item.category.as_str());
    format!(
        "<a class=\"card\" href=\"{}\"><div class=\"badge {}\">{}</div><div class=\"title\">{}</div></a>",
        item_href(item.id),
        category,
        category,
        escape_html(&item.name)
    )
}

/// The searchable list page
pub fn list_page(view: &ListView) -> String {
    let cards: Vec<String> = view.results.iter().map(|it| result_card(it)).collect();

    let body = format!(
        "{}\n{}\n{}\n<div id=\"count\">{}</div>\n<div id=\"results\">{}</div>",
        search_form(&view.search, &view.key),
        section_tabs(view),
        confusing_chips(&view.confusing),
        count_label(view.results.len()),
        cards.join("")
    );

    page(APP_NAME, &body)
}

/// List page when the catalogue failed to load. Search box stays usable.
pub fn list_error_page(search: &str, key: &CategoryKey) -> String {
    let body = format!(
        "{}\n<div id=\"results\"><div class=\"card\">{}</div></div>",
        search_form(search, key),
        LIST_LOAD_ERROR
    );

    page(APP_NAME, &body)
}

// ============================================================================
// DETAIL VIEW
// ============================================================================

fn bullet_list(id: &str, entries: &[String]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|e| format!("<li>{}</li>", escape_html(e)))
        .collect();
    format!("<ul id=\"{}\">{}</ul>", id, items.join(""))
}

/// The detail page of one item
pub fn item_page(item: &Item, advice: &Advice) -> String {
    let category = escape_html(item.category.as_str());

    // Do/avoid box is only shown when there is something to say
    let do_avoid = if advice.do_message.is_empty() {
        String::new()
    } else {
        format!(
            "<section id=\"do-avoid\"><p><strong>Do:</strong> <span id=\"do-text\">{}</span></p>\
             <p><strong>Avoid:</strong> <span id=\"avoid-text\">{}</span></p></section>",
            escape_html(&advice.do_message),
            escape_html(&advice.avoid_message)
        )
    };

    let body = format!(
        "<h1 id=\"item-name\">{}</h1>\n<div id=\"item-category\" class=\"badge {}\">{}</div>\n\
         <section class=\"card\"><p id=\"verdict\">{}</p><p id=\"bin-where\">{}</p></section>\n{}\n\
         <h2>Rules</h2>\n{}\n<h2>Common mistakes</h2>\n{}\n\
         <a href=\"/\" class=\"tab\">{}</a>",
        escape_html(&item.name),
        category,
        category,
        escape_html(&advice.verdict),
        escape_html(&advice.destination),
        do_avoid,
        bullet_list("rules", &item.rules),
        bullet_list("mistakes", &item.mistakes),
        BACK_TO_SEARCH
    );

    page(&item_title(item), &body)
}

/// Detail page for an id with no item
pub fn not_found_page() -> String {
    let body = format!(
        "<div class=\"card\" style=\"padding:20px; text-align:center;\">\
         <p>{}</p><a href=\"/\" class=\"tab\" style=\"display:inline-block; margin-top:10px;\">{}</a></div>",
        NOT_FOUND_MESSAGE, BACK_TO_SEARCH
    );

    page(NOT_FOUND_TITLE, &body)
}

/// Detail page when the catalogue failed to load
pub fn item_error_page() -> String {
    let body = format!("<h1 id=\"item-name\">{}</h1>", ITEM_LOAD_ERROR);
    page(APP_NAME, &body)
}

// ============================================================================
// TESTS
// ============================================================================
