use crate::client::{check_status, ForgeClient};
use crate::endpoint::Endpoint;
use crate::Result;
use forge_core::types::ExportFormat;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A downloaded playbook export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Write the document into `dir` under its filename, atomically.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        forge_core::io::atomic_write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub fn default_filename(project_id: &str, format: ExportFormat) -> String {
    format!("{project_id}-playbook.{}", format.extension())
}

/// Extract a bare file name from a `Content-Disposition` header value.
/// Directory components are stripped.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let raw = value.split(';').map(str::trim).find_map(|part| {
        let (key, val) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| val.trim().trim_matches('"').to_string())
    })?;
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

impl ForgeClient {
    pub async fn export_playbook(
        &self,
        project_id: &str,
        format: ExportFormat,
    ) -> Result<ExportedDocument> {
        let url = self.url(&format!("{}/{project_id}", Endpoint::ExportPlaybook.path()));
        debug!(%url, %format, "export request");

        let resp = self
            .authorize(self.http().get(&url))
            .query(&[("format", format.as_str())])
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let headers = resp.headers();
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| default_filename(project_id, format));
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format.content_type().to_string());
        let bytes = resp.bytes().await?.to_vec();

        Ok(ExportedDocument {
            filename,
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn disposition_parsing() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="hub-playbook.md""#).as_deref(),
            Some("hub-playbook.md")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=plain.json").as_deref(),
            Some("plain.json")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn fallback_name_uses_extension() {
        assert_eq!(
            default_filename("hub", ExportFormat::Markdown),
            "hub-playbook.md"
        );
        assert_eq!(default_filename("hub", ExportFormat::Zip), "hub-playbook.zip");
    }

    #[test]
    fn save_in_writes_file() {
        let dir = TempDir::new().unwrap();
        let doc = ExportedDocument {
            filename: "hub-playbook.json".to_string(),
            content_type: "application/json".to_string(),
            bytes: b"{}".to_vec(),
        };
        let path = doc.save_in(dir.path()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"{}");
    }
}
