//! XLSX generation from the workbook model.
//!
//! Builds a minimal SpreadsheetML package: one worksheet part per sheet, text
//! stored as inline strings, numbers as plain values, no styling.

use super::{Cell, Sheet, Workbook};
use crate::error::{DumpError, Result};
use regex::Regex;
use std::io::{Cursor, Seek, Write};
use std::sync::LazyLock;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Matches text that a reader would otherwise decode as an `_xHHHH_` escape.
static ESCAPE_LOOKALIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_(x[0-9A-Fa-f]{4}_)").expect("escape pattern is valid")
});

/// XLSX document writer.
pub struct XlsxWriter<'a> {
    workbook: &'a Workbook,
}

impl<'a> XlsxWriter<'a> {
    /// Creates a writer over the given workbook.
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// Generate the XLSX package as bytes.
    pub fn generate(&self) -> Result<Vec<u8>> {
        if self.workbook.is_empty() {
            return Err(DumpError::serialization(
                "workbook has no sheets; nothing was exported",
            ));
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        write_part(&mut zip, options, "[Content_Types].xml", &self.content_types())?;
        write_part(&mut zip, options, "_rels/.rels", &root_rels())?;
        write_part(&mut zip, options, "docProps/app.xml", &self.app_xml())?;
        write_part(&mut zip, options, "xl/workbook.xml", &self.workbook_xml())?;
        write_part(
            &mut zip,
            options,
            "xl/_rels/workbook.xml.rels",
            &self.workbook_rels(),
        )?;
        write_part(&mut zip, options, "xl/styles.xml", &styles_xml())?;

        for (i, sheet) in self.workbook.sheets().iter().enumerate() {
            let path = format!("xl/worksheets/sheet{}.xml", i + 1);
            write_part(&mut zip, options, &path, &sheet_xml(sheet))?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn content_types(&self) -> String {
        let mut content = format!(
            r#"{XML_DECLARATION}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#
        );

        for i in 1..=self.workbook.sheet_count() {
            content.push_str(&format!(
                "  <Override PartName=\"/xl/worksheets/sheet{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n"
            ));
        }

        content.push_str("</Types>");
        content
    }

    fn app_xml(&self) -> String {
        format!(
            r#"{XML_DECLARATION}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
  <Application>db-xl-dump</Application>
  <AppVersion>{}</AppVersion>
</Properties>"#,
            app_version()
        )
    }

    fn workbook_xml(&self) -> String {
        let mut content = format!(
            "{XML_DECLARATION}\n<workbook xmlns=\"{NS_MAIN}\" xmlns:r=\"{NS_REL}\">\n  <sheets>\n"
        );

        for (i, sheet) in self.workbook.sheets().iter().enumerate() {
            content.push_str(&format!(
                "    <sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>\n",
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str("  </sheets>\n</workbook>");
        content
    }

    fn workbook_rels(&self) -> String {
        let mut content = format!(
            "{XML_DECLARATION}\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n"
        );

        let count = self.workbook.sheet_count();
        for i in 1..=count {
            content.push_str(&format!(
                "  <Relationship Id=\"rId{i}\" Type=\"{NS_REL}/worksheet\" Target=\"worksheets/sheet{i}.xml\"/>\n"
            ));
        }
        content.push_str(&format!(
            "  <Relationship Id=\"rId{}\" Type=\"{NS_REL}/styles\" Target=\"styles.xml\"/>\n",
            count + 1
        ));

        content.push_str("</Relationships>");
        content
    }
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    path: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(path, options)?;
    zip.write_all(content.as_bytes())
        .map_err(|e| DumpError::serialization(format!("Failed to write {path}: {e}")))
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECLARATION}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{NS_REL}/officeDocument" Target="xl/workbook.xml"/>
  <Relationship Id="rId2" Type="{NS_REL}/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    )
}

fn styles_xml() -> String {
    format!(
        r#"{XML_DECLARATION}
<styleSheet xmlns="{NS_MAIN}">
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
    )
}

/// Renders one worksheet part.
fn sheet_xml(sheet: &Sheet) -> String {
    let mut content = format!("{XML_DECLARATION}\n<worksheet xmlns=\"{NS_MAIN}\">\n  <sheetData>\n");

    for (r, row) in sheet.rows().iter().enumerate() {
        let row_number = r + 1;
        content.push_str(&format!("    <row r=\"{row_number}\">"));

        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), row_number);
            match cell {
                Cell::Numeric(v) => {
                    content.push_str(&format!("<c r=\"{reference}\"><v>{v}</v></c>"));
                }
                Cell::Text(s) => {
                    content.push_str(&format!(
                        "<c r=\"{reference}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                        escape_cell_text(s)
                    ));
                }
            }
        }

        content.push_str("</row>\n");
    }

    content.push_str("  </sheetData>\n</worksheet>");
    content
}

/// Converts a zero-based column index to spreadsheet letters (0 -> A, 26 -> AA).
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escapes cell text, encoding XML-illegal control characters as `_xHHHH_`.
fn escape_cell_text(s: &str) -> String {
    let protected = ESCAPE_LOOKALIKE.replace_all(s, "_x005F_$1");
    let escaped = escape_xml(&protected);

    if !escaped.chars().any(is_illegal_xml_char) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len());
    for ch in escaped.chars() {
        if is_illegal_xml_char(ch) {
            out.push_str(&format!("_x{:04X}_", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

fn is_illegal_xml_char(ch: char) -> bool {
    (ch < '\u{20}' && !matches!(ch, '\t' | '\n' | '\r')) || matches!(ch, '\u{FFFE}' | '\u{FFFF}')
}

fn app_version() -> String {
    // AppVersion must look like XX.YYYY
    let major: u32 = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0);
    let minor: u32 = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0);
    format!("{major:02}.{minor:04}")
}
