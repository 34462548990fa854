//! Checks callers can run on a response text.
//!
//! The executor never interprets what it returns. These helpers are for
//! callers that asked an API for `format=json` or `format=xml` and want to
//! know whether they got it.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use crate::errors::{ApiError, DocumentKind, Result};

/// Parses `text` as JSON.
pub fn validate_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse {
        kind: DocumentKind::Json,
        message: e.to_string(),
    })
}

pub fn is_json(text: &str) -> bool {
    validate_json(text).is_ok()
}

/// Walks `text` as an XML document and returns the number of elements in it.
///
/// End tags must match their start tags, every element must be closed and
/// there has to be at least one element.
pub fn validate_xml(text: &str) -> Result<usize> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut depth = 0usize;
    let mut elements = 0usize;
    loop {
        let event = reader.read_event().map_err(|e| xml_error(format!(
            "{e} at position {}",
            reader.buffer_position()
        )))?;
        match event {
            Event::Start(_) => {
                depth += 1;
                elements += 1;
            }
            Event::Empty(_) => elements += 1,
            Event::End(end) => {
                if depth == 0 {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    return Err(xml_error(format!("unexpected closing tag </{name}>")));
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(xml_error(format!("{depth} element(s) left unclosed")));
    }
    if elements == 0 {
        return Err(xml_error("no element found".to_string()));
    }
    Ok(elements)
}

pub fn is_xml(text: &str) -> bool {
    validate_xml(text).is_ok()
}

fn xml_error(message: String) -> ApiError {
    ApiError::Parse {
        kind: DocumentKind::Xml,
        message,
    }
}
