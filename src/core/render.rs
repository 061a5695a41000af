use crate::domain::model::{Publication, RenderedFragment};

const EMPTY_PLACEHOLDER: &str = "<p><em>No papers listed yet.</em></p>\n";

/// Newest first; equal dates fall back to the identifier so the order is total.
pub fn sort_publications(mut publications: Vec<Publication>) -> Vec<Publication> {
    publications.sort_by(|a, b| {
        b.published
            .cmp(&a.published)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    publications
}

pub fn render_fragment(
    publications: &[Publication],
    highlight_author: Option<&str>,
) -> RenderedFragment {
    let sorted = sort_publications(publications.to_vec());

    if sorted.is_empty() {
        return RenderedFragment {
            html: EMPTY_PLACEHOLDER.to_string(),
            publication_count: 0,
        };
    }

    let highlight = highlight_author
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty());

    let mut html = String::new();
    let mut current_year = None;

    for publication in &sorted {
        let year = publication.year();
        if current_year != Some(year) {
            if current_year.is_some() {
                html.push('\n');
            }
            html.push_str(&format!(
                "<h2 style=\"margin-top:20px;border-bottom:2px solid #333;padding-bottom:5px;\">{}</h2>\n",
                year
            ));
            current_year = Some(year);
        }

        html.push_str(&render_paper(publication, highlight.as_deref()));
    }

    RenderedFragment {
        html,
        publication_count: sorted.len(),
    }
}

fn render_paper(publication: &Publication, highlight: Option<&str>) -> String {
    let authors = publication
        .authors
        .iter()
        .map(|name| {
            let escaped = escape_html(name);
            match highlight {
                Some(h) if name.trim().to_lowercase() == h => format!("<strong>{}</strong>", escaped),
                _ => escaped,
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "<div class=\"paper\">\n  <h3><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></h3>\n  <p><strong>Authors:</strong> {}</p>\n  <p><strong>Originally submitted:</strong> {}</p>\n</div>\n<hr>\n",
        escape_html(&publication.link),
        escape_html(&publication.title),
        authors,
        publication.pretty_date()
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
