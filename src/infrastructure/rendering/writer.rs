//! PDF document assembly with lopdf

use std::path::Path;

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};

use super::layout::{PageSize, FONT_NAME};
use crate::domain::DomainError;

/// Assemble `pages` into a PDF and write it to `output`.
///
/// Every page shares one Courier font resource and the given page size.
pub fn write_pdf(pages: Vec<Content>, size: PageSize, output: &Path) -> Result<(), DomainError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_NAME => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for content in pages {
        let encoded = content
            .encode()
            .map_err(|e| DomainError::render(format!("Failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(size.width),
                Object::Real(size.height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(output).map_err(|e| {
        DomainError::render(format!("Failed to write PDF '{}': {}", output.display(), e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rendering::layout::layout_text;

    #[test]
    fn test_written_pdf_loads_with_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let body = vec!["row"; 120].join("\n");

        write_pdf(layout_text(&body), PageSize::LETTER, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("out.pdf");

        let err = write_pdf(layout_text("x"), PageSize::A4, &output).unwrap_err();
        assert!(matches!(err, DomainError::Render { .. }));
    }
}
