//! Server-rendered analysis page.

use el_core::{ArticleAnalysis, ArticleOutcome, FeedReport};

pub const NO_GRAPH_MESSAGE: &str = "Not enough entities to map relationships.";

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1c2430; }
header { background: #1C6EA4; color: white; padding: 1rem 2rem; }
main { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }
form.feed { display: flex; gap: 0.5rem; margin-bottom: 1.5rem; }
form.feed input { flex: 1; padding: 0.5rem; font-size: 1rem; }
button, a.button { padding: 0.5rem 1rem; font-size: 1rem; border: none; border-radius: 4px; cursor: pointer; }
button { background: #1C6EA4; color: white; }
a.button { background: #ddd; color: #1c2430; text-decoration: none; }
.card { background: white; border-radius: 6px; padding: 1rem 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.error { color: #a4161a; }
.info { background: #e8f1f8; padding: 0.75rem; border-radius: 4px; }
.columns { display: flex; gap: 2rem; flex-wrap: wrap; }
.columns > div { flex: 1; min-width: 240px; }
iframe { width: 100%; height: 780px; border: none; }
"#;

/// Escapes text for HTML element content and double-quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The full page. `feed_url` refills the form, `body` goes below it.
pub fn render_page(feed_url: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>EntiLytics</title>
    <style>{css}</style>
</head>
<body>
    <header><h1>EntiLytics</h1></header>
    <main>
        <form class="feed" method="post" action="/analyze">
            <input type="url" name="feed_url" placeholder="RSS feed URL" value="{feed_url}" required>
            <button type="submit">Enter</button>
            <a class="button" href="/clear">Clear</a>
        </form>
        {body}
    </main>
</body>
</html>"#,
        css = CSS,
        feed_url = escape_html(feed_url),
        body = body,
    )
}

pub fn render_error(message: &str) -> String {
    format!(r#"<div class="card error">Error: {}</div>"#, escape_html(message))
}

pub fn render_report(report: &FeedReport) -> String {
    if report.outcomes.is_empty() {
        return format!(
            r#"<div class="info">No articles found in {}.</div>"#,
            escape_html(&report.feed_url)
        );
    }
    report
        .outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| render_outcome(i + 1, outcome))
        .collect()
}

fn render_outcome(position: usize, outcome: &ArticleOutcome) -> String {
    match outcome {
        ArticleOutcome::Analysed(analysis) => render_analysis(position, analysis),
        ArticleOutcome::Failed { article, error } => format!(
            r#"<section class="card"><h2>{}. {}</h2><p class="error">Analysis failed: {}</p></section>"#,
            position,
            escape_html(&article.title),
            escape_html(error)
        ),
    }
}

fn render_analysis(position: usize, analysis: &ArticleAnalysis) -> String {
    let article = &analysis.article;

    let entities: String = if analysis.entities.is_empty() {
        "<li>No entities found.</li>".to_string()
    } else {
        analysis
            .entities
            .iter()
            .map(|e| {
                format!(
                    "<li>{} [{}] (Confidence: {:.2})</li>",
                    escape_html(&e.text),
                    escape_html(&e.label),
                    e.confidence
                )
            })
            .collect()
    };

    let ranked: String = analysis
        .ranking
        .entities
        .iter()
        .map(|e| format!("<li>{}: {:.4}</li>", escape_html(&e.name), e.score))
        .collect();

    let graph = match &analysis.graph_html {
        Some(html) => format!(r#"<iframe srcdoc="{}"></iframe>"#, escape_html(html)),
        None => format!(r#"<div class="info">{}</div>"#, NO_GRAPH_MESSAGE),
    };

    let link = if article.link.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p><a href="{0}" target="_blank" rel="noopener">{0}</a></p>"#,
            escape_html(&article.link)
        )
    };

    format!(
        r#"<section class="card">
    <h2>{position}. {title}</h2>
    <p><small>Published: {published}</small></p>
    {link}
    <h3>Description</h3>
    <p>{description}</p>
    <h3>Summary</h3>
    <p>{summary}</p>
    <div class="columns">
        <div><h3>Entities</h3><ul>{entities}</ul></div>
        <div><h3>Top Entities ({mode})</h3><ul>{ranked}</ul></div>
    </div>
    <h3>Entity Connections</h3>
    {graph}
</section>"#,
        position = position,
        title = escape_html(&article.title),
        published = escape_html(&article.published),
        link = link,
        description = escape_html(&el_core::text::clean_html(&article.description)),
        summary = escape_html(&analysis.summary.summary),
        entities = entities,
        mode = analysis.ranking.mode,
        ranked = ranked,
        graph = graph,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use el_core::{Article, Ranking, ScoringMode, Summary};

    fn analysis(graph_html: Option<String>) -> ArticleAnalysis {
        ArticleAnalysis {
            article: Article::from_text("<Title>", "<p>Body & more.</p>"),
            entities: Vec::new(),
            ranking: Ranking::empty(ScoringMode::Cosine),
            summary: Summary {
                summary: "Body & more.".to_string(),
                sentence_count: 1,
                threshold_used: None,
                selected_scores: Vec::new(),
            },
            relationships: Vec::new(),
            graph_html,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_missing_graph_shows_message() {
        let html = render_analysis(1, &analysis(None));
        assert!(html.contains(NO_GRAPH_MESSAGE));
        assert!(html.contains("1. &lt;Title&gt;"));
        assert!(html.contains("Body &amp; more."));
    }

    #[test]
    fn test_graph_embedded_in_srcdoc() {
        let html = render_analysis(2, &analysis(Some("<div id=\"g\"></div>".to_string())));
        assert!(html.contains(r#"<iframe srcdoc="&lt;div id=&quot;g&quot;&gt;&lt;/div&gt;"></iframe>"#));
        assert!(!html.contains(NO_GRAPH_MESSAGE));
    }
}
