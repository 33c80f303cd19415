use crate::session::SearchPage;

pub fn header(level: usize, text: &str) -> String {
    let level = level.max(1);
    format!("{} {}", "#".repeat(level), text)
}

pub fn bold(label: &str, value: &str) -> String {
    format!("**{}:** {}", label, value)
}

pub fn link(text: &str, url: &str) -> String {
    format!("[{}]({})", escape(text), url)
}

fn escape(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Renders a page of hits as a Markdown document.
pub fn search_page(page: &SearchPage) -> String {
    let mut lines = vec![
        header(1, &format!("Search results for \"{}\"", page.query)),
        String::new(),
        bold("Matches", &page.total.to_string()),
        String::new(),
    ];

    if page.hits.is_empty() {
        lines.push("No symbols start with that text.".to_string());
        return lines.join("\n");
    }

    for hit in &page.hits {
        let mut line = format!("- {}", link(&hit.label, &hit.url));
        if let Some(scope) = &hit.scope {
            line.push_str(&format!(" — `{scope}`"));
        }
        lines.push(line);
    }
    if page.truncated() {
        lines.push(String::new());
        lines.push(format!(
            "_Showing {} of {} matches._",
            page.hits.len(),
            page.total
        ));
    }
    lines.join("\n")
}
