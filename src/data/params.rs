use super::model::ParameterSet;

/// Marker of a result record line.
const RESULT_MARKER: &str = "R|";

/// Remove everything outside printable ASCII (`0x20..=0x7E`).
pub fn clean_line(line: &str) -> String {
    line.chars().filter(|c| (' '..='~').contains(c)).collect()
}

/// Extract named numeric results from `R|` lines.
///
/// Field layout: `R|seq|^^^NAME|VALUE|unit|...`. Lines with four or fewer
/// fields or a non-numeric value are skipped.
pub fn extract_parameters(text: &str) -> ParameterSet {
    let mut params = ParameterSet::default();

    for raw_line in text.split(['\n', '\r']) {
        let line = clean_line(raw_line);
        if !line.contains(RESULT_MARKER) {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() <= 4 {
            continue;
        }

        let name = parts[2].replace("^^^", "");
        let name = name.trim();
        match parts[3].trim().parse::<f64>() {
            Ok(value) => params.insert(name, value),
            Err(_) => log::trace!("skipping non-numeric result '{name}' = '{}'", parts[3]),
        }
    }

    log::debug!("extracted {} parameter(s)", params.len());
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line_drops_control_and_non_ascii() {
        assert_eq!(clean_line("\x02R|1|^^^MCV|87.9\x03\r"), "R|1|^^^MCV|87.9");
        assert_eq!(clean_line("µL"), "L");
    }

    #[test]
    fn test_extracts_result_lines_in_order() {
        let text = "H|\\^&|||Yumizen\r\
                    P|1\r\
                    R|1|^^^WBC|6.4|10^3/uL|||N\r\
                    R|2|^^^MCV|87.9|fL|||N\r\n\
                    R|3|^^^RDW-CV|13.2|%|||N\n\
                    R|4|^^^NEU%|64.1|%|||N\r\
                    L|1|N";
        let params = extract_parameters(text);
        let got: Vec<(&str, f64)> = params.iter().collect();
        assert_eq!(
            got,
            vec![("WBC", 6.4), ("MCV", 87.9), ("RDW-CV", 13.2), ("NEU%", 64.1)]
        );
    }

    #[test]
    fn test_skips_short_and_non_numeric_lines() {
        let text = "R|1|^^^MPV|7.8\n\
                    R|2|^^^FLAG|High|||\n\
                    R|3|^^^PDW|9.2|fL|\n\
                    R|4|^^^PLT|HISTOGRAM|FLOATLE-stream/deflate:base64^Y2AA|x";
        let params = extract_parameters(text);
        assert_eq!(params.get("MPV"), None);
        assert_eq!(params.get("FLAG"), None);
        assert_eq!(params.get("PDW"), Some(9.2));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_control_bytes_inside_fields_are_ignored() {
        let params = extract_parameters("\x05R|1|^^^M\x17PV|7\x1f.8|fL|");
        assert_eq!(params.get("MPV"), Some(7.8));
    }
}
