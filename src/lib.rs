mod block;
mod config;
mod error;
mod html;
mod inline;
mod parser;
mod typst;

pub use block::{Block, List, ListItem, ListKind, Span, spans_plain_text};
pub use config::{ClassConfig, Config, FontConfig, HtmlConfig, LinksConfig, PageConfig};
pub use error::{Error, Result};
pub use html::{render as render_html, standalone_document};

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Parse reply text into a vector of blocks.
pub fn parse(text: &str) -> Vec<Block> {
    parser::parse(text)
}

/// Parse the inline markup of a single line into spans.
pub fn format_inline(text: &str) -> Vec<Span> {
    inline::format(text)
}

/// Convert reply text to HTML using the bundled default config.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_html_with_config(markdown, &Config::compiled_default())
}

/// Convert reply text to HTML with custom config.
pub fn markdown_to_html_with_config(markdown: &str, config: &Config) -> String {
    let blocks = parse(markdown);
    html::blocks_to_html(&blocks, config)
}

/// Convert reply text to Typst markup using the bundled default config.
pub fn markdown_to_typst(markdown: &str) -> String {
    markdown_to_typst_with_config(markdown, &Config::compiled_default())
}

/// Convert reply text to Typst markup with custom config.
pub fn markdown_to_typst_with_config(markdown: &str, config: &Config) -> String {
    let blocks = parse(markdown);
    typst::blocks_to_typst(&blocks, config)
}

/// Convert reply text to PDF bytes using the bundled default config.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>> {
    markdown_to_pdf_with_config(markdown, &Config::compiled_default())
}

/// Convert reply text to PDF bytes with custom config.
pub fn markdown_to_pdf_with_config(markdown: &str, config: &Config) -> Result<Vec<u8>> {
    use typst_library::layout::PagedDocument;

    let typst_content = markdown_to_typst_with_config(markdown, config);

    // System fonts are only searched when a sans face is requested
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(config.font.sans);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))?;

    let pdf = typst_pdf::pdf(&doc, &PdfOptions::default())
        .map_err(|e| Error::Pdf(format!("{:?}", e)))?;
    log::debug!("Generated {} byte PDF", pdf.len());
    Ok(pdf)
}
