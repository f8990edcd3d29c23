//! Rendered preview of the document.
//!
//! The same comrak options drive both outputs: a standalone themed HTML page
//! (used for export) and styled terminal lines (shown in the preview pane).

mod html;
mod terminal;

pub use html::{render_body, render_page};
pub use terminal::render_lines;

use comrak::Options;

/// Enable the GitHub-flavored extensions the preview understands.
fn configure(options: &mut Options) {
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.shortcodes = true;
    // Inline HTML such as <u> is the document's own content.
    options.render.unsafe_ = true;
}
