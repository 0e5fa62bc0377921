//! Legacy Word (.doc) extractor
//!
//! Opens the compound file, reads the file information block at the start of
//! the `WordDocument` stream and follows the piece table kept in the table
//! stream to collect the main document text. Headers, footnotes, style sheets
//! and font tables live outside that character range and are never read.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use async_trait::async_trait;
use cfb::CompoundFile;

use crate::domain::extraction::{ExtractedContent, FormatExtractor};
use crate::domain::DomainError;

/// OLE2 compound file signature
pub(super) const COMPOUND_FILE_MAGIC: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

const WORD_DOCUMENT_STREAM: &str = "/WordDocument";
const TABLE_STREAM_0: &str = "/0Table";
const TABLE_STREAM_1: &str = "/1Table";

/// `wIdent` of Word 97 and later
const FIB_IDENT: u16 = 0xa5ec;
const FIB_BASE_LEN: usize = 32;
const FIB_FLAGS_OFFSET: usize = 0x0a;
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;

/// Position of `ccpText` in FibRgLw97
const CCP_TEXT_INDEX: usize = 3;
/// Position of the `fcClx`/`lcbClx` pair in FibRgFcLcb97
const CLX_PAIR_INDEX: usize = 33;

const CLXT_PRC: u8 = 0x01;
const CLXT_PCDT: u8 = 0x02;
const PCD_LEN: usize = 8;
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3fff_ffff;

/// Pulls the main body text out of Word 97-2003 binary documents.
#[derive(Debug, Clone, Default)]
pub struct LegacyDocExtractor;

impl LegacyDocExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
struct FileInfo {
    table_stream: &'static str,
    ccp_text: usize,
    fc_clx: usize,
    lcb_clx: usize,
}

#[derive(Debug)]
struct Piece {
    cp_start: usize,
    cp_end: usize,
    fc: u32,
}

fn truncated(what: &str) -> DomainError {
    DomainError::extraction(format!("Corrupt Word document: truncated {}", what))
}

fn read_u16(bytes: &[u8], offset: usize, what: &str) -> Result<u16, DomainError> {
    bytes
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| truncated(what))
}

fn read_u32(bytes: &[u8], offset: usize, what: &str) -> Result<u32, DomainError> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| truncated(what))
}

fn read_stream<F: Read + Seek>(
    file: &mut CompoundFile<F>,
    name: &str,
) -> Result<Vec<u8>, DomainError> {
    let mut stream = file.open_stream(name).map_err(|e| {
        DomainError::extraction(format!(
            "Not a Word document: missing '{}' stream ({})",
            name.trim_start_matches('/'),
            e
        ))
    })?;

    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).map_err(|e| {
        DomainError::io(format!("Failed to read '{}' stream: {}", name, e))
    })?;

    Ok(bytes)
}

fn parse_file_info(word: &[u8]) -> Result<FileInfo, DomainError> {
    const FIB: &str = "file information block";

    if read_u16(word, 0, FIB)? != FIB_IDENT {
        return Err(DomainError::extraction(
            "Unsupported Word document: only Word 97 and later are readable",
        ));
    }

    let flags = read_u16(word, FIB_FLAGS_OFFSET, FIB)?;
    if flags & FLAG_ENCRYPTED != 0 {
        return Err(DomainError::extraction(
            "Encrypted Word documents are not supported",
        ));
    }

    let csw = usize::from(read_u16(word, FIB_BASE_LEN, FIB)?);
    let cslw_offset = FIB_BASE_LEN + 2 + csw * 2;
    let cslw = usize::from(read_u16(word, cslw_offset, FIB)?);
    let rg_lw = cslw_offset + 2;
    if cslw <= CCP_TEXT_INDEX {
        return Err(truncated(FIB));
    }
    let ccp_text = read_u32(word, rg_lw + CCP_TEXT_INDEX * 4, FIB)? as usize;

    let pairs_offset = rg_lw + cslw * 4;
    let pairs = usize::from(read_u16(word, pairs_offset, FIB)?);
    if pairs <= CLX_PAIR_INDEX {
        return Err(truncated(FIB));
    }
    let clx = pairs_offset + 2 + CLX_PAIR_INDEX * 8;

    Ok(FileInfo {
        table_stream: if flags & FLAG_WHICH_TABLE != 0 {
            TABLE_STREAM_1
        } else {
            TABLE_STREAM_0
        },
        ccp_text,
        fc_clx: read_u32(word, clx, FIB)? as usize,
        lcb_clx: read_u32(word, clx + 4, FIB)? as usize,
    })
}

/// Walk the Clx: skip property modifiers, then read the piece descriptors
fn parse_pieces(clx: &[u8]) -> Result<Vec<Piece>, DomainError> {
    let mut pos = 0;

    while let Some(&kind) = clx.get(pos) {
        match kind {
            CLXT_PRC => {
                let len = usize::from(read_u16(clx, pos + 1, "piece table")?);
                pos += 3 + len;
            }
            CLXT_PCDT => {
                let len = read_u32(clx, pos + 1, "piece table")? as usize;
                let plc = clx
                    .get(pos + 5..pos + 5 + len)
                    .ok_or_else(|| truncated("piece table"))?;
                return piece_descriptors(plc);
            }
            other => {
                return Err(DomainError::extraction(format!(
                    "Corrupt Word document: unexpected piece table entry 0x{:02x}",
                    other
                )));
            }
        }
    }

    Err(DomainError::extraction(
        "Corrupt Word document: no piece table",
    ))
}

fn piece_descriptors(plc: &[u8]) -> Result<Vec<Piece>, DomainError> {
    if plc.len() < 4 || (plc.len() - 4) % (4 + PCD_LEN) != 0 {
        return Err(truncated("piece table"));
    }

    let count = (plc.len() - 4) / (4 + PCD_LEN);
    let descriptors = (count + 1) * 4;

    (0..count)
        .map(|i| {
            Ok(Piece {
                cp_start: read_u32(plc, i * 4, "piece table")? as usize,
                cp_end: read_u32(plc, (i + 1) * 4, "piece table")? as usize,
                fc: read_u32(plc, descriptors + i * PCD_LEN + 2, "piece table")?,
            })
        })
        .collect()
}

/// 8-bit pieces are stored as Windows-1252
fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20ac}',
        0x85 => '\u{2026}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201c}',
        0x94 => '\u{201d}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        other => char::from(other),
    }
}

/// Characters `[0, ccp_text)` of the document, in piece order
fn main_document_text(
    word: &[u8],
    pieces: &[Piece],
    ccp_text: usize,
) -> Result<String, DomainError> {
    let mut text = String::new();

    for piece in pieces {
        if piece.cp_start >= ccp_text {
            break;
        }
        let chars = piece.cp_end.min(ccp_text).saturating_sub(piece.cp_start);

        if piece.fc & FC_COMPRESSED != 0 {
            let start = ((piece.fc & FC_MASK) / 2) as usize;
            let bytes = word
                .get(start..start + chars)
                .ok_or_else(|| truncated("text piece"))?;
            text.extend(bytes.iter().map(|&b| cp1252_char(b)));
        } else {
            let start = (piece.fc & FC_MASK) as usize;
            let bytes = word
                .get(start..start + chars * 2)
                .ok_or_else(|| truncated("text piece"))?;
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            text.push_str(&String::from_utf16_lossy(&units));
        }
    }

    Ok(text)
}

/// Map Word's in-text control characters to plain text. Field instructions
/// are dropped and field results kept.
fn clean_word_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // One entry per open field, true once its separator was seen
    let mut fields: Vec<bool> = Vec::new();

    for c in raw.chars() {
        match c {
            '\u{13}' => fields.push(false),
            '\u{14}' => {
                if let Some(in_result) = fields.last_mut() {
                    *in_result = true;
                }
            }
            '\u{15}' => {
                fields.pop();
            }
            _ if fields.iter().any(|in_result| !in_result) => {}
            '\r' | '\u{0b}' | '\u{0c}' => out.push('\n'),
            '\u{07}' => out.push('\t'),
            '\u{1e}' => out.push('-'),
            '\u{a0}' => out.push(' '),
            '\t' | '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Main body text of a compound-file Word document
pub fn doc_text(bytes: &[u8]) -> Result<String, DomainError> {
    if !bytes.starts_with(&COMPOUND_FILE_MAGIC) {
        return Err(DomainError::extraction(
            "Not a legacy Word document (missing compound file signature)",
        ));
    }

    let mut file = CompoundFile::open(Cursor::new(bytes)).map_err(|e| {
        DomainError::extraction(format!("Unreadable compound file: {}", e))
    })?;

    let word = read_stream(&mut file, WORD_DOCUMENT_STREAM)?;
    let info = parse_file_info(&word)?;
    let table = read_stream(&mut file, info.table_stream)?;

    let clx = table
        .get(info.fc_clx..info.fc_clx + info.lcb_clx)
        .ok_or_else(|| truncated("piece table"))?;
    let pieces = parse_pieces(clx)?;

    Ok(clean_word_text(&main_document_text(
        &word,
        &pieces,
        info.ccp_text,
    )?))
}

#[async_trait]
impl FormatExtractor for LegacyDocExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["doc"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::io(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let text = tokio::task::spawn_blocking(move || doc_text(&bytes))
            .await
            .map_err(|e| DomainError::internal(format!("Extraction task failed: {}", e)))??;

        Ok(ExtractedContent::text(text))
    }
}
