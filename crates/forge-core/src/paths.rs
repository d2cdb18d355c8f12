use crate::error::{ForgeError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SUTRA_DIR: &str = ".sutra";
pub const PROJECTS_DIR: &str = ".sutra/projects";
pub const EXPORTS_DIR: &str = ".sutra/exports";
pub const CONFIG_FILE: &str = ".sutra/config.yaml";
pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const GUEST_USAGE_FILE: &str = ".sutra/guest-usage.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn sutra_dir(root: &Path) -> PathBuf {
    root.join(SUTRA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn projects_dir(root: &Path) -> PathBuf {
    root.join(PROJECTS_DIR)
}

pub fn project_dir(root: &Path, id: &str) -> PathBuf {
    projects_dir(root).join(id)
}

pub fn project_manifest(root: &Path, id: &str) -> PathBuf {
    project_dir(root, id).join(MANIFEST_FILE)
}

pub fn exports_dir(root: &Path) -> PathBuf {
    root.join(EXPORTS_DIR)
}

pub fn guest_usage_path(root: &Path) -> PathBuf {
    root.join(GUEST_USAGE_FILE)
}

// ---------------------------------------------------------------------------
// Project id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_project_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(ForgeError::InvalidProjectId(id.to_string()));
    }
    Ok(())
}

/// Derive a project id from a display name: lowercase, runs of other
/// characters collapsed to a single hyphen, truncated to 64.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out.truncate(64);
    out.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        for id in ["a", "prompt-hub", "v2", "my-saas-idea-2026"] {
            validate_project_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_ids() {
        for id in ["", "-lead", "trail-", "has spaces", "Upper", "a_b"] {
            assert!(validate_project_id(id).is_err(), "expected invalid: {id}");
        }
        assert!(validate_project_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Prompt Hub"), "prompt-hub");
        assert_eq!(slugify("  AI -- Copilot!! v2 "), "ai-copilot-v2");
        assert_eq!(slugify("***"), "");
        let long = slugify(&"ab ".repeat(40));
        assert!(long.len() <= 64);
        assert!(validate_project_id(&long).is_ok());
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.sutra/config.yaml")
        );
        assert_eq!(
            project_manifest(root, "demo"),
            PathBuf::from("/tmp/proj/.sutra/projects/demo/manifest.yaml")
        );
    }
}
