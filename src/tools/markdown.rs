use std::collections::HashSet;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

/// Render Markdown to HTML. Ghost converts the HTML to Lexical itself when
/// the write request carries `?source=html`.
///
/// Every heading gets an `id` anchor built from its text, so in-page links
/// like `#getting-started` keep working once the post is published.
pub fn markdown_to_html(md: &str) -> String {
    let mut events: Vec<Event> = Parser::new_ext(md, Options::ENABLE_TABLES).collect();

    let mut headings = Vec::new();
    let mut open: Option<(usize, String)> = None;
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { id: None, .. }) => open = Some((i, String::new())),
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text)) = open.as_mut() {
                    text.push_str(t);
                }
            }
            Event::End(TagEnd::Heading(_)) => headings.extend(open.take()),
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    for (i, text) in headings {
        let anchor = unique(slugify(&text), &mut seen);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(anchor.into());
        }
    }

    let mut out = String::with_capacity(md.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Lowercase ASCII slug: punctuation dropped, runs of spaces and hyphens
/// folded into one `-`.
fn slugify(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-') || c.is_whitespace())
        .collect();
    let mut slug = String::with_capacity(kept.len());
    let mut in_gap = false;
    for c in kept.trim().chars() {
        if c == '-' || c.is_whitespace() {
            if !in_gap {
                slug.push('-');
            }
            in_gap = true;
        } else {
            slug.push(c.to_ascii_lowercase());
            in_gap = false;
        }
    }
    slug
}

/// First free anchor: `intro`, then `intro_1`, `intro_2`, ...
fn unique(mut id: String, seen: &mut HashSet<String>) -> String {
    while id.is_empty() || seen.contains(&id) {
        id = match id.rsplit_once('_') {
            Some((base, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                match n.parse::<u64>() {
                    Ok(n) => format!("{base}_{}", n + 1),
                    Err(_) => format!("{id}_1"),
                }
            }
            _ => format!("{id}_1"),
        };
    }
    seen.insert(id.clone());
    id
}
