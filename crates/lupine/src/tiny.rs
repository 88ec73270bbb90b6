//! Parser for the tab-delimited Tiny v1 mapping-description lines.

use crate::record::MappingRecord;

/// The three record lists produced by one parse of a mapping payload.
#[derive(Debug, Default, Clone)]
pub struct ParsedMappings {
    pub classes: Vec<MappingRecord>,
    pub fields: Vec<MappingRecord>,
    pub methods: Vec<MappingRecord>,
}

/// Parses mapping-description lines into class, field, and method records.
///
/// Recognized shapes, one record per line:
///
/// ```text
/// CLASS\t<official>\t<intermediaryPath>\t<mappedPath>
/// FIELD\t<parentOfficial>\t<typeSig>\t<official>\t<intermediaryPath>\t<mappedPath>
/// METHOD\t<parentOfficial>\t<methodSig>\t<official>\t<intermediaryPath>\t<mappedPath>
/// ```
///
/// Intermediary and mapped paths are `/`-separated; only the final segment
/// is kept. Lines with an unrecognized first column, and lines with too few
/// columns, are silently ignored so additional tag kinds can appear in the
/// payload without breaking the store.
pub fn parse_lines<I, S>(lines: I) -> ParsedMappings
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedMappings::default();

    for line in lines {
        let columns: Vec<&str> = line.as_ref().split('\t').collect();

        match columns[0] {
            "CLASS" if columns.len() >= 4 => parsed.classes.push(MappingRecord {
                parent_official_name: None,
                official_name: columns[1].to_string(),
                intermediary_name: last_segment(columns[2]).to_string(),
                mapped_name: last_segment(columns[3]).to_string(),
            }),
            "FIELD" if columns.len() >= 6 => parsed.fields.push(member_record(&columns)),
            "METHOD" if columns.len() >= 6 => parsed.methods.push(member_record(&columns)),
            _ => {}
        }
    }

    parsed
}

fn member_record(columns: &[&str]) -> MappingRecord {
    MappingRecord {
        parent_official_name: Some(columns[1].to_string()),
        official_name: columns[3].to_string(),
        intermediary_name: last_segment(columns[4]).to_string(),
        mapped_name: last_segment(columns[5]).to_string(),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
