//! Atom feed generation.
//!
//! Renders one `feed.xml` per language from post metadata. Entries are
//! newest-first by published date, capped by the configured limit.
//!
//! # Feed format
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en">
//!   <title>Site Title</title>
//!   <entry>
//!     <title>Post Title</title>
//!     <link href="https://example.com/en/posts/post.html"/>
//!     ...
//!   </entry>
//! </feed>
//! ```

use chrono::Utc;

use crate::i18n::Lang;

use super::builder::PostMeta;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Render the Atom feed XML for one language.
pub fn render_feed(
    posts: &[PostMeta],
    lang: Lang,
    site_title: &str,
    site_url: &str,
    limit: usize,
) -> String {
    let mut sorted: Vec<&PostMeta> = posts.iter().collect();
    sorted.sort_by(|a, b| b.published_date.cmp(&a.published_date));

    let mut xml = String::with_capacity(4096);
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str(&format!(
        "<feed xmlns=\"{ATOM_NS}\" xml:lang=\"{lang}\">\n"
    ));
    xml.push_str(&format!("  <title>{}</title>\n", escape_xml(site_title)));
    xml.push_str(&format!(
        "  <link href=\"{site_url}/{lang}/feed.xml\" rel=\"self\"/>\n"
    ));
    xml.push_str(&format!("  <link href=\"{site_url}/{lang}/\"/>\n"));
    xml.push_str(&format!(
        "  <updated>{}</updated>\n",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    ));
    xml.push_str(&format!("  <id>{site_url}/{lang}/</id>\n"));
    xml.push_str("  <author>\n");
    xml.push_str(&format!("    <name>{}</name>\n", escape_xml(site_title)));
    xml.push_str("  </author>\n");

    for post in sorted.iter().take(limit) {
        xml.push_str("  <entry>\n");
        xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
        xml.push_str(&format!(
            "    <link href=\"{site_url}/{lang}/{}\"/>\n",
            post.url
        ));
        xml.push_str(&format!("    <id>{site_url}/{lang}/{}</id>\n", post.url));
        xml.push_str(&format!(
            "    <updated>{}T00:00:00Z</updated>\n",
            post.published_date
        ));
        xml.push_str(&format!(
            "    <summary>{}</summary>\n",
            escape_xml(&post.excerpt)
        ));
        xml.push_str("  </entry>\n");
    }

    xml.push_str("</feed>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_post(title: &str, date: &str, slug: &str) -> PostMeta {
        PostMeta {
            title: title.to_string(),
            published_date: date.to_string(),
            published_date_formatted: String::new(),
            updated_date: date.to_string(),
            updated_date_formatted: String::new(),
            was_updated: false,
            excerpt: format!("About {title}"),
            url: format!("posts/{slug}.html"),
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_feed_empty() {
        let xml = render_feed(&[], Lang::En, "Site", "https://example.com", 20);

        assert!(xml.contains("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains(&format!("<feed xmlns=\"{ATOM_NS}\" xml:lang=\"en\">")));
        assert!(xml.contains("</feed>"));
        assert!(!xml.contains("<entry>"));
    }

    #[test]
    fn test_feed_entries_newest_first() {
        let posts = vec![
            make_post("Older", "2025-01-01", "older"),
            make_post("Newer", "2026-01-01", "newer"),
        ];
        let xml = render_feed(&posts, Lang::En, "Site", "https://example.com", 20);

        let newer = xml.find("<title>Newer</title>").unwrap();
        let older = xml.find("<title>Older</title>").unwrap();
        assert!(newer < older);
        assert!(xml.contains("<link href=\"https://example.com/en/posts/newer.html\"/>"));
        assert!(xml.contains("<updated>2026-01-01T00:00:00Z</updated>"));
    }

    #[test]
    fn test_feed_respects_limit() {
        let posts: Vec<PostMeta> = (0..5)
            .map(|i| make_post(&format!("Post {i}"), &format!("2026-01-0{}", i + 1), "p"))
            .collect();
        let xml = render_feed(&posts, Lang::En, "Site", "https://example.com", 3);

        assert_eq!(xml.matches("<entry>").count(), 3);
    }

    #[test]
    fn test_feed_escapes_title_and_summary() {
        let mut post = make_post("Q & A", "2026-01-01", "qa");
        post.excerpt = "On <tags>".to_string();
        let xml = render_feed(&[post], Lang::Pt, "Site", "https://example.com", 20);

        assert!(xml.contains("<title>Q &amp; A</title>"));
        assert!(xml.contains("<summary>On &lt;tags&gt;</summary>"));
        assert!(xml.contains("xml:lang=\"pt\""));
    }
}
