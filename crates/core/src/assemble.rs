//! Page assembly: stitching fetched content into a template.
//!
//! One call produces the final HTML for one page. The body fragment is
//! cleaned (CMS URLs rewritten), optionally reshaped for assignment pages
//! (intro paragraph and assignment block relocated), then inserted into the
//! template's content region; titles, accent colors, and responsive imagery
//! are applied on the way through. Query reads go through `scraper`, all
//! mutation through the `lol_html` streaming rewriter.

use std::borrow::Cow;
use std::cell::Cell;
use std::collections::HashMap;

use lol_html::html_content::ContentType;
use lol_html::{HtmlRewriter, Settings, element};
use regex::Regex;
use scraper::{Html, Selector};

use crate::content::ASSIGNMENT_TAG;
use crate::images::{grid_image_html, hero_image_html};
use crate::media::MediaAsset;
use crate::template::accent_color;
use crate::text::{capitalize_first, decode_entities, rewrite_cms_urls};
use crate::{Result, StitchpressError};

/// Reserved page name for the front page.
pub const FRONT_PAGE_NAME: &str = "index";

const SITE_NAME: &str = "Lectoraat Responsible IT";
const FRONT_PAGE_HEADING: &str = "<span>AI,</span><span>AI,</span><span>AI</span>";
const FALLBACK_TITLE: &str = "No title";

/// What the front page knows about one assignment: its downloaded image and
/// its accent color, injected into the matching listing link.
#[derive(Debug, Clone)]
pub struct AssignmentFeature {
    pub image: MediaAsset,
    pub color: String,
}

/// Everything the assembler needs for one page.
pub struct PageInput<'a> {
    /// Slug, or [`FRONT_PAGE_NAME`] for the front page.
    pub page_name: &'a str,
    /// Raw, entity-encoded title as rendered by the CMS.
    pub title: &'a str,
    /// Raw body HTML fragment.
    pub body: &'a str,
    pub tags: &'a [String],
    pub featured_image: Option<&'a MediaAsset>,
    /// Front page only: assignment slug -> feature for listing links.
    pub assignment_features: Option<&'a HashMap<String, AssignmentFeature>>,
}

/// Assembles one page against a template and returns the final HTML.
pub fn assemble_page(template: &str, input: &PageInput, site_host: &str) -> Result<String> {
    let is_front = input.page_name == FRONT_PAGE_NAME;
    let is_assignment = input.tags.iter().any(|t| t == ASSIGNMENT_TAG);

    let mut body = rewrite_cms_urls(input.body, site_host);

    // Assignment pages donate their first paragraph to the intro region and
    // their assignment block to just after the content region.
    let mut intro = None;
    let mut assignment_block = None;
    if is_assignment {
        let fragment = Html::parse_fragment(&body);
        let p = Selector::parse("p").unwrap();
        intro = fragment.select(&p).next().map(|el| el.inner_html());
        let block = Selector::parse(".wp-block-group.assignment").unwrap();
        assignment_block = fragment.select(&block).next().map(|el| el.html());

        body = strip_relocated(&body, intro.is_some())?;
    }

    if is_front && let Some(features) = input.assignment_features {
        body = enhance_assignment_links(&body, features)?;
    }

    let (heading, heading_is_html, doc_title) = if is_front {
        (FRONT_PAGE_HEADING.to_string(), true, format!("AIAIAI | {}", SITE_NAME))
    } else {
        let decoded = decode_entities(input.title);
        let title = if decoded.trim().is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            capitalize_first(&decoded)
        };
        (title.clone(), false, format!("{} | {}", title, SITE_NAME))
    };

    let color = accent_color(input.tags);
    let hero = input.featured_image.map(hero_image_html).unwrap_or_default();

    // Each handler owns what it injects; the rewriter outlives this scope's
    // intermediate bindings.
    let mut handlers = vec![
        element!("title", move |el| {
            el.set_inner_content(&doc_title, ContentType::Text);
            Ok(())
        }),
        element!(".section--content__block--hero h1", move |el| {
            let kind = if heading_is_html { ContentType::Html } else { ContentType::Text };
            el.set_inner_content(&heading, kind);
            Ok(())
        }),
        element!(".wp-content", move |el| {
            if el.get_attribute("data-wp-content").as_deref() == Some("content") {
                el.set_inner_content(&body, ContentType::Html);
                if let Some(block) = &assignment_block {
                    el.after(block, ContentType::Html);
                }
            }
            Ok(())
        }),
    ];

    if is_assignment {
        handlers.push(element!("body", move |el| {
            let previous = el.get_attribute("style").unwrap_or_default();
            let needs_semicolon = !previous.is_empty() && !previous.trim_end().ends_with(';');
            let style = format!(
                "{}{}{}--assignment-color: var(--{c}); --assignment-color-l: var(--{c}-l); --assignment-color-d: var(--{c}-d);",
                previous,
                if needs_semicolon { ";" } else { "" },
                if previous.is_empty() { "" } else { " " },
                c = color,
            );
            el.set_attribute("style", &style).ok();
            el.set_attribute("data-color", &color).ok();
            Ok(())
        }));
        if let Some(intro) = intro {
            let intro_html = format!("<p>{}</p>", intro);
            handlers.push(element!(".section--content__block--intro", move |el| {
                el.set_inner_content(&intro_html, ContentType::Html);
                Ok(())
            }));
        }
    }

    if !hero.is_empty() {
        handlers.push(element!(".section--content__block--hero", move |el| {
            el.append(&hero, ContentType::Html);
            Ok(())
        }));
    }

    rewrite_html(template, handlers)
}

/// Removes the relocated fragments from the body: the first paragraph (when
/// it was captured for the intro) and every assignment block.
fn strip_relocated(body: &str, strip_first_p: bool) -> Result<String> {
    let first_p_stripped = Cell::new(!strip_first_p);

    rewrite_html(
        body,
        vec![
            element!("p", |el| {
                if !first_p_stripped.get() {
                    first_p_stripped.set(true);
                    el.remove();
                }
                Ok(())
            }),
            element!(".wp-block-group.assignment", |el| {
                el.remove();
                Ok(())
            }),
        ],
    )
}

/// Front page only: wraps each listing-link's text in a paragraph and, when
/// the link targets a known assignment, prepends its grid image and attaches
/// its accent color.
fn enhance_assignment_links(body: &str, features: &HashMap<String, AssignmentFeature>) -> Result<String> {
    let selector = "li.wp-block-pages-list__item a.wp-block-pages-list__item__link";

    // Read pass: link text by href, since the rewriter cannot see inner text
    // while replacing it.
    let fragment = Html::parse_fragment(body);
    let read = Selector::parse(selector).unwrap();
    let mut texts: HashMap<String, String> = HashMap::new();
    for link in fragment.select(&read) {
        if let Some(href) = link.value().attr("href") {
            texts.insert(href.to_string(), link.text().collect::<String>().trim().to_string());
        }
    }

    let slug_re = Regex::new(r"\./([^.]+?)(?:\.html)?$").unwrap();

    rewrite_html(
        body,
        vec![element!(selector, |el| {
            let Some(href) = el.get_attribute("href") else { return Ok(()) };
            let Some(text) = texts.get(&href) else { return Ok(()) };

            let mut inner = format!("<p>{}</p>", text);
            if let Some(slug) = slug_re.captures(&href).map(|caps| caps[1].to_string())
                && let Some(feature) = features.get(&slug)
            {
                let figure = grid_image_html(&feature.image);
                if !figure.is_empty() {
                    inner = format!("{}{}", figure, inner);
                }
                el.set_attribute("style", &format!("--assignment-color: var(--{});", feature.color))
                    .ok();
            }
            el.set_inner_content(&inner, ContentType::Html);
            Ok(())
        })],
    )
}

/// Runs a set of element handlers over `html` and collects the output.
fn rewrite_html(
    html: &str, handlers: Vec<(Cow<'_, lol_html::Selector>, lol_html::ElementContentHandlers<'_>)>,
) -> Result<String> {
    let mut output = Vec::new();
    let mut rewriter = HtmlRewriter::new(
        Settings { element_content_handlers: handlers, ..Settings::new() },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| StitchpressError::HtmlRewrite(e.to_string()))?;
    rewriter.end().map_err(|e| StitchpressError::HtmlRewrite(e.to_string()))?;

    String::from_utf8(output).map_err(|e| StitchpressError::HtmlRewrite(e.to_string()))
}
