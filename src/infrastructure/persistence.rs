use crate::application::{SequenceRequest, SequenceResponse};
use std::fs;

pub struct FileRepository;

impl FileRepository {
    pub fn save_request(request: &SequenceRequest, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(request) {
            Ok(json) => match fs::write(filename, &json) {
                Ok(_) => Ok(filename.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }

    pub fn load_request(filename: &str) -> Result<(SequenceRequest, String), String> {
        match fs::read_to_string(filename) {
            Ok(content) => match serde_json::from_str::<SequenceRequest>(&content) {
                Ok(request) => Ok((request, filename.to_string())),
                Err(e) => Err(format!("Invalid file format - {}", e)),
            },
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn save_response(response: &SequenceResponse, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(response) {
            Ok(json) => match fs::write(filename, &json) {
                Ok(_) => Ok(filename.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }
}

pub struct CsvExporter;

impl CsvExporter {
    const HEADER: [&'static str; 3] = ["k", "value", "expression"];

    /// Writes one row per term of a successful response.
    pub fn export_terms(response: &SequenceResponse, filename: &str) -> Result<String, String> {
        Self::ensure_exportable(response)?;
        let writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;
        Self::write_terms(writer, response)?;
        Ok(filename.to_string())
    }

    /// Same rows as [`CsvExporter::export_terms`], as a string.
    pub fn terms_to_string(response: &SequenceResponse) -> Result<String, String> {
        Self::ensure_exportable(response)?;
        let mut buffer = Vec::new();
        Self::write_terms(csv::Writer::from_writer(&mut buffer), response)?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }

    fn ensure_exportable(response: &SequenceResponse) -> Result<(), String> {
        match &response.error {
            Some(error) => Err(format!("nothing to export, the calculation failed ({})", error)),
            None => Ok(()),
        }
    }

    fn write_terms<W: std::io::Write>(mut writer: csv::Writer<W>, response: &SequenceResponse) -> Result<(), String> {
        writer.write_record(Self::HEADER).map_err(|e| e.to_string())?;
        for term in &response.terms {
            writer
                .write_record([
                    term.k.to_string(),
                    term.value.to_string(),
                    term.expression.clone().unwrap_or_default(),
                ])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Calculator;
    use tempfile::tempdir;

    #[test]
    fn test_request_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("request.json");
        let filename = path.to_str().unwrap();
        let request = SequenceRequest::new("k^2", "2", "4");

        assert_eq!(FileRepository::save_request(&request, filename), Ok(filename.to_string()));
        let (loaded, name) = FileRepository::load_request(filename).unwrap();
        assert_eq!(loaded, request);
        assert_eq!(name, filename);
    }

    #[test]
    fn test_load_request_reports_bad_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();

        let err = FileRepository::load_request(path.to_str().unwrap()).unwrap_err();
        assert!(err.starts_with("Invalid file format"));

        let missing = dir.path().join("missing.json");
        assert!(FileRepository::load_request(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_save_response_writes_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("response.json");
        let response = Calculator::default().calculate(&SequenceRequest::new("k", "1", "3"));

        FileRepository::save_response(&response, path.to_str().unwrap()).unwrap();
        let written: SequenceResponse = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, response);
    }

    #[test]
    fn test_csv_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("terms.csv");
        let response = Calculator::default().calculate(&SequenceRequest::new("1/k", "1", "2"));

        CsvExporter::export_terms(&response, path.to_str().unwrap()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "k,value,expression\n1,1,1/1\n2,0.5,1/2\n");
    }

    #[test]
    fn test_csv_export_refuses_failed_response() {
        let response = Calculator::default().calculate(&SequenceRequest::new("", "1", "2"));
        let err = CsvExporter::terms_to_string(&response).unwrap_err();
        assert!(err.contains("the formula cannot be empty"));
    }
}
