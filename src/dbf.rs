// dBase attribute tables in a legacy code page, re-encoded as UTF-8 for the
// `dbase` reader (which only decodes UTF-8 without its `yore` code pages).

use anyhow::{anyhow, bail, Context, Result};
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const HEADER_SIZE: usize = 32;
const DESCRIPTOR_SIZE: usize = 32;
const DESCRIPTOR_TERMINATOR: u8 = 0x0D;
const FILE_TERMINATOR: u8 = 0x1A;
const UTF8_CODE_PAGE: u8 = 0xF0;
const MAX_FIELD_LENGTH: usize = 255;

/// WHATWG labels, plus the Windows code page numbers GIS tools write to `.cpg`.
fn lookup(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes()).or_else(|| match label.to_ascii_lowercase().as_str() {
        "932" | "cp932" => Some(SHIFT_JIS),
        "65001" | "cp65001" => Some(UTF_8),
        _ => None,
    })
}

/// Encoding of the `.dbf` next to `shp_path`: the configured label first,
/// then the `.cpg` sidecar, then Shift_JIS.
pub fn encoding_for(shp_path: &Path, configured: Option<&str>) -> Result<&'static Encoding> {
    if let Some(label) = configured {
        return lookup(label).ok_or_else(|| anyhow!("Unknown dbf encoding: {:?}", label));
    }

    let cpg = shp_path.with_extension("cpg");
    if cpg.exists() {
        let label = fs::read_to_string(&cpg)
            .with_context(|| format!("Failed to read code page file: {:?}", cpg))?;
        match lookup(&label) {
            Some(encoding) => return Ok(encoding),
            None => warn!(path = ?cpg, label = label.trim(), "unknown code page, assuming Shift_JIS"),
        }
    }

    Ok(SHIFT_JIS)
}

struct Column {
    length: usize,
    text: bool,
}

fn u16_at(bytes: &[u8], at: usize) -> usize {
    u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
}

fn trim_field(raw: &[u8]) -> &[u8] {
    let end = raw.iter().rposition(|b| *b != b' ' && *b != 0).map_or(0, |i| i + 1);
    &raw[..end]
}

/// Rewrites a dBase table so its character fields hold UTF-8 text.
///
/// Character fields are widened to the longest re-encoded value; every other
/// field is copied byte for byte.
pub fn transcode(bytes: &[u8], encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(bytes.to_vec());
    }
    if bytes.len() < HEADER_SIZE {
        bail!("dBase header is truncated");
    }

    let num_records = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let header_len = u16_at(bytes, 8);
    if header_len > bytes.len() {
        bail!("dBase header length {} exceeds file size {}", header_len, bytes.len());
    }

    let mut columns = Vec::new();
    let mut at = HEADER_SIZE;
    while at + DESCRIPTOR_SIZE <= header_len && bytes[at] != DESCRIPTOR_TERMINATOR {
        columns.push(Column { length: bytes[at + 16] as usize, text: bytes[at + 11] == b'C' });
        at += DESCRIPTOR_SIZE;
    }
    let record_len = 1 + columns.iter().map(|c| c.length).sum::<usize>();

    let mut rows: Vec<Vec<Vec<u8>>> = Vec::with_capacity(num_records);
    let mut widths: Vec<usize> = columns.iter().map(|c| c.length).collect();
    for record in 0..num_records {
        let start = header_len + record * record_len;
        let raw = bytes
            .get(start..start + record_len)
            .ok_or_else(|| anyhow!("dBase record {} is truncated", record))?;

        let mut fields = Vec::with_capacity(columns.len() + 1);
        fields.push(raw[..1].to_vec());
        let mut offset = 1;
        for (i, column) in columns.iter().enumerate() {
            let value = &raw[offset..offset + column.length];
            offset += column.length;
            if column.text {
                let (text, malformed) = encoding.decode_without_bom_handling(trim_field(value));
                if malformed {
                    warn!(record, encoding = encoding.name(), "undecodable bytes in dBase text field");
                }
                widths[i] = widths[i].max(text.len());
                fields.push(text.into_owned().into_bytes());
            } else {
                fields.push(value.to_vec());
            }
        }
        rows.push(fields);
    }

    if let Some(width) = widths.iter().find(|w| **w > MAX_FIELD_LENGTH) {
        bail!("dBase text field needs {} bytes as UTF-8, more than {}", width, MAX_FIELD_LENGTH);
    }

    let new_record_len = 1 + widths.iter().sum::<usize>();
    let mut out = Vec::with_capacity(header_len + num_records * new_record_len + 1);
    out.extend_from_slice(&bytes[..header_len]);
    out[10..12].copy_from_slice(&(new_record_len as u16).to_le_bytes());
    out[29] = UTF8_CODE_PAGE;
    for (i, width) in widths.iter().enumerate() {
        out[HEADER_SIZE + i * DESCRIPTOR_SIZE + 16] = *width as u8;
    }

    for fields in rows {
        let mut fields = fields.into_iter();
        if let Some(flag) = fields.next() {
            out.extend_from_slice(&flag);
        }
        for ((value, column), width) in fields.zip(&columns).zip(&widths) {
            out.extend_from_slice(&value);
            if column.text {
                out.resize(out.len() + width - value.len(), b' ');
            }
        }
    }
    out.push(FILE_TERMINATOR);

    debug!(records = num_records, encoding = encoding.name(), "transcoded dBase table to UTF-8");
    Ok(out)
}
