//! Modes presentation: the dispatch table as a terminal table or json.

use crate::error::FlexgenError;
use crate::mode::{GenerationTarget, PayloadKind, ResponseShape};
use crate::request::RequestBuilder;
use comfy_table::Table;

fn payload_name(kind: PayloadKind) -> &'static str {
    match kind {
        PayloadKind::Text => "text",
        PayloadKind::Count => "count",
    }
}

pub fn format_modes_table(base_url: &str) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Mode", "Subtype", "Endpoint", "Payload", "Result"]);
    let builder = RequestBuilder::new(base_url);
    for target in GenerationTarget::ALL {
        let entry = target.entry();
        let subtype = target
            .subtype()
            .map(|s| s.code().to_string())
            .unwrap_or_else(|| "-".to_string());
        let result = match entry.response {
            ResponseShape::File { filename } => filename.to_string(),
            ResponseShape::Inline => "inline".to_string(),
        };
        table.add_row(vec![
            target.mode().slug().to_string(),
            subtype,
            builder.endpoint_for(target),
            payload_name(entry.payload).to_string(),
            result,
        ]);
    }
    table.to_string()
}

pub fn format_modes_json(base_url: &str) -> Result<String, FlexgenError> {
    let builder = RequestBuilder::new(base_url);
    let rows: Vec<serde_json::Value> = GenerationTarget::ALL
        .iter()
        .map(|target| {
            let entry = target.entry();
            serde_json::json!({
                "mode": target.mode().slug(),
                "label": target.mode().label(),
                "subtype": target.subtype().map(|s| s.code()),
                "endpoint": builder.endpoint_for(*target),
                "payload": payload_name(entry.payload),
                "filename": target.filename(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&rows)
        .map_err(|e| FlexgenError::InputError(format!("Failed to serialize modes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_table_lists_every_target() {
        let table = format_modes_table("http://localhost:8080/");
        assert!(table.contains("http://localhost:8080/generate-doc"));
        assert!(!table.contains("8080//"));
        assert!(table.contains("STDCUSAC_Cases.xlsx"));
        assert!(table.contains("inline"));
    }

    #[test]
    fn test_modes_json() {
        let json = format_modes_json("http://gen").unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2]["subtype"], "STDCIF");
        assert_eq!(rows[2]["payload"], "count");
        assert_eq!(rows[4]["filename"], serde_json::Value::Null);
    }

    #[test]
    fn test_modes_endpoints_match_submitted_requests() {
        let json = format_modes_json("http://gen:5000//").unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        let builder = RequestBuilder::new("http://gen:5000//");
        for (row, target) in rows.iter().zip(GenerationTarget::ALL) {
            assert_eq!(row["endpoint"], builder.endpoint_for(target));
        }
        assert_eq!(rows[0]["endpoint"], "http://gen:5000/generate-doc");
    }
}
