//! Document response types
//!
//! Responses expose `pdfUrl` and never filesystem paths.

use serde::{Deserialize, Serialize};

use crate::domain::{DocumentRecord, TableRows};

/// Message returned with a successful upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File processed successfully";

/// Entry in `GET /documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListItem {
    pub id: u64,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub pdf_url: String,
}

impl From<&DocumentRecord> for DocumentListItem {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id().value(),
            original_file_name: record.original_file_name().to_string(),
            stored_file_name: record.stored_file_name().to_string(),
            mime_type: record.mime_type().to_string(),
            size: record.size(),
            pdf_url: record.pdf_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub count: usize,
    pub items: Vec<DocumentListItem>,
}

impl DocumentListResponse {
    pub fn new(records: &[DocumentRecord]) -> Self {
        Self {
            count: records.len(),
            items: records.iter().map(DocumentListItem::from).collect(),
        }
    }
}

/// Summary returned after an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: u64,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub preview: String,
    pub is_table: bool,
    pub pdf_url: String,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id().value(),
            original_file_name: record.original_file_name().to_string(),
            stored_file_name: record.stored_file_name().to_string(),
            mime_type: record.mime_type().to_string(),
            size: record.size(),
            preview: record.preview().to_string(),
            is_table: record.is_table(),
            pdf_url: record.pdf_url(),
        }
    }
}

/// Full record for `GET /documents/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    pub id: u64,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub extracted_text: String,
    pub preview: String,
    pub is_table: bool,
    pub table_rows: Option<TableRows>,
    pub pdf_url: String,
    pub created_at: String,
}

impl From<&DocumentRecord> for DocumentDetail {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id().value(),
            original_file_name: record.original_file_name().to_string(),
            stored_file_name: record.stored_file_name().to_string(),
            mime_type: record.mime_type().to_string(),
            size: record.size(),
            extracted_text: record.extracted_text().to_string(),
            preview: record.preview().to_string(),
            is_table: record.is_table(),
            table_rows: record.table_rows().cloned(),
            pdf_url: record.pdf_url(),
            created_at: record.created_at().to_rfc3339(),
        }
    }
}

/// Response to a single-file upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub document: DocumentSummary,
}

impl UploadResponse {
    pub fn new(record: &DocumentRecord) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            document: record.into(),
        }
    }
}

/// Per-file outcome in a multi-file upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadItem {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
}

impl BatchUploadItem {
    pub fn succeeded(record: &DocumentRecord) -> Self {
        Self {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            document: Some(record.into()),
            original_file_name: None,
        }
    }

    pub fn failed(original_file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            document: None,
            original_file_name: Some(original_file_name.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUploadResponse {
    pub message: String,
    pub results: Vec<BatchUploadItem>,
}

impl BatchUploadResponse {
    pub fn new(results: Vec<BatchUploadItem>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();

        Self {
            message: format!("Processed {} of {} files successfully", succeeded, results.len()),
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::fixtures::text_document;
    use crate::domain::{DocumentId, ExtractedContent};
    use crate::domain::CellValue;

    fn record() -> DocumentRecord {
        DocumentRecord::new(DocumentId::new(3).unwrap(), text_document("a.txt", "alpha"))
    }

    #[test]
    fn test_list_item_has_no_paths() {
        let json = serde_json::to_value(DocumentListResponse::new(&[record()])).unwrap();

        assert_eq!(json["count"], 1);
        assert_eq!(json["items"][0]["id"], 3);
        assert_eq!(json["items"][0]["originalFileName"], "a.txt");
        assert_eq!(json["items"][0]["pdfUrl"], "/documents/3/pdf");
        assert!(json["items"][0].get("pdfPath").is_none());
        assert!(json["items"][0].get("path").is_none());
    }

    #[test]
    fn test_detail_includes_content() {
        let mut new_doc = text_document("t.csv", "");
        new_doc.content = ExtractedContent::table(vec![vec![CellValue::text("h")]]);
        let detail = DocumentDetail::from(&DocumentRecord::new(DocumentId::new(1).unwrap(), new_doc));
        let json = serde_json::to_value(detail).unwrap();

        assert_eq!(json["isTable"], true);
        assert_eq!(json["extractedText"], "h");
        assert_eq!(json["tableRows"][0][0], "h");
        assert!(json.get("pdfPath").is_none());
    }

    #[test]
    fn test_upload_response_shape() {
        let json = serde_json::to_value(UploadResponse::new(&record())).unwrap();

        assert_eq!(json["message"], UPLOAD_SUCCESS_MESSAGE);
        assert_eq!(json["document"]["preview"], "alpha");
        assert_eq!(json["document"]["isTable"], false);
    }

    #[test]
    fn test_batch_items() {
        let response = BatchUploadResponse::new(vec![
            BatchUploadItem::failed("bad.doc", "Extraction error: not a Word file"),
            BatchUploadItem::succeeded(&record()),
        ]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(response.message, "Processed 1 of 2 files successfully");
        assert_eq!(json["results"][0]["success"], false);
        assert_eq!(json["results"][0]["originalFileName"], "bad.doc");
        assert!(json["results"][0].get("document").is_none());
        assert_eq!(json["results"][1]["document"]["id"], 3);
    }
}
