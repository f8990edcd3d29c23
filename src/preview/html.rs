use comrak::{Options, markdown_to_html};

use crate::config::PreviewTheme;

const BASE_CSS: &str = r"
body { margin: 0; padding: 2rem; background: var(--bg); color: var(--fg);
  font: 16px/1.6 -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; }
.markdown-body { max-width: 52rem; margin: 0 auto; }
h1, h2 { border-bottom: 1px solid var(--border); padding-bottom: .3em; }
a { color: var(--link); }
code, pre { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; background: var(--code-bg); }
code { padding: .15em .35em; border-radius: 4px; }
pre { padding: 1em; border-radius: 6px; overflow-x: auto; }
pre code { padding: 0; background: none; }
blockquote { margin: 0; padding: 0 1em; color: var(--muted); border-left: .25em solid var(--border); }
table { border-collapse: collapse; }
th, td { border: 1px solid var(--border); padding: .3em .8em; }
hr { border: 0; border-top: 1px solid var(--border); }
";

const LIGHT_VARS: &str =
    "--bg: #ffffff; --fg: #1f2328; --muted: #59636e; --border: #d1d9e0; --link: #0969da; --code-bg: #f6f8fa;";
const DARK_VARS: &str =
    "--bg: #0d1117; --fg: #e6edf3; --muted: #9198a1; --border: #3d444d; --link: #4493f8; --code-bg: #151b23;";

/// Render markdown to an HTML fragment.
pub fn render_body(markdown: &str) -> String {
    let mut options = Options::default();
    super::configure(&mut options);
    markdown_to_html(markdown, &options)
}

/// Render markdown to a standalone HTML page in the given theme.
pub fn render_page(markdown: &str, title: &str, theme: PreviewTheme) -> String {
    let theme_css = match theme {
        PreviewTheme::Light => format!(":root {{ {LIGHT_VARS} }}"),
        PreviewTheme::Dark => format!(":root {{ {DARK_VARS} }}"),
        PreviewTheme::System => format!(
            ":root {{ {LIGHT_VARS} }}\n@media (prefers-color-scheme: dark) {{ :root {{ {DARK_VARS} }} }}"
        ),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{theme_css}\n{BASE_CSS}</style>\n</head>\n<body data-theme=\"{}\">\n<article class=\"markdown-body\">\n{}</article>\n</body>\n</html>\n",
        escape(title),
        theme.as_str(),
        render_body(markdown),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
