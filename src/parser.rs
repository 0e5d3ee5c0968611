//! Extracts [`Record`]s from a ranking listing page.
//!
//! Every assumption about the shape of the listing markup lives in this module.
//! One entry is a `div.item`; its fields are found by selectors relative to it.

use anyhow::{bail, Context};
use itertools::Itertools;
use log::{debug, trace, warn};
use scraper::{ElementRef, Html, Node};

use crate::schema::{Record, Title};

/// Parses every entry on the page, failing on the first malformed one.
pub fn parse(html: &Html) -> anyhow::Result<Vec<Record>> {
    let records = items(html)
        .enumerate()
        .map(|(i, item)| parse_entry(item).with_context(|| format!("While parsing item #{i}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    debug!("Parsed {} records", records.len());
    Ok(records)
}

/// Like [`parse`], but skips malformed entries and returns their errors alongside.
pub fn parse_lenient(html: &Html) -> (Vec<Record>, Vec<anyhow::Error>) {
    items(html)
        .enumerate()
        .map(|(i, item)| parse_entry(item).with_context(|| format!("While parsing item #{i}")))
        .partition_result()
}

pub fn items(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    html.select(selector!("div.item"))
}

pub fn parse_entry(item: ElementRef) -> anyhow::Result<Record> {
    let detail_link = item
        .select(selector!("a[href]"))
        .next()
        .and_then(|a| a.attr("href"))
        .context("Detail link not found")?;
    let image_link = item
        .select(selector!("img[src]"))
        .next()
        .and_then(|img| img.attr("src"))
        .context("Image link not found")?;
    let title = parse_title(item)?;
    trace!("Parsing entry {title:?}");

    let rating = item
        .select(selector!("span.rating_num"))
        .next()
        .context("Rating span not found")?
        .text()
        .collect::<String>()
        .trim()
        .to_owned();
    if rating.parse::<f64>().is_err() {
        warn!("Rating of {title:?} does not look like a number: {rating:?}");
    }

    let rating_count = item
        .select(selector!("span"))
        .find_map(|span| {
            regex!(r"^\s*(\d+)人评价\s*$")
                .captures(&span.text().collect::<String>())
                .map(|captures| captures[1].to_owned())
        })
        .context("Rating count span not found")?;

    let tagline = item
        .select(selector!("span.inq"))
        .next()
        .map(|span| strip_periods(span.text().collect::<String>().trim()))
        .unwrap_or_default();

    let summary = item
        .select(selector!("p:not(.quote)"))
        .next()
        .context("Summary paragraph not found")?;
    let summary = collapse_whitespace(&strip_slashes(&paragraph_text(summary)));

    Ok(Record::builder()
        .detail_link(detail_link)
        .image_link(image_link)
        .title(title)
        .rating(rating)
        .rating_count(rating_count)
        .tagline(tagline)
        .summary(summary)
        .build())
}

fn parse_title(item: ElementRef) -> anyhow::Result<Title> {
    let titles = item
        .select(selector!("span.title"))
        .map(|span| span.text().collect::<String>())
        .collect_vec();
    let primary = match titles.first() {
        Some(primary) => primary.trim().to_owned(),
        None => bail!("Title span not found"),
    };
    if titles.len() != 2 {
        return Ok(Title::Single(primary));
    }
    let secondary = collapse_whitespace(&strip_slashes(&titles[1]));
    // The second span is sometimes just a separator.
    if secondary.is_empty() || secondary == primary {
        return Ok(Title::Single(primary));
    }
    Ok(Title::Dual { primary, secondary })
}

/// Text content of a paragraph, with each `<br>` turned into a space.
pub fn paragraph_text(p: ElementRef) -> String {
    let mut text = String::new();
    for node in p.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push(' '),
            _ => {}
        }
    }
    text
}

pub fn strip_slashes(s: &str) -> String {
    s.replace('/', "")
}

pub fn strip_periods(s: &str) -> String {
    s.replace('.', "")
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}
