//! Problem banks stored as JSON files under the content root.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use iobj_domain::ProblemBank;

use crate::infrastructure::ports::{ProblemBankRepo, RepoError};

pub struct FileProblemBank {
    root: PathBuf,
}

impl FileProblemBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `file` under the root, refusing anything that could escape it.
    fn resolve(&self, file: &str) -> Result<PathBuf, RepoError> {
        let relative = Path::new(file);
        if file.trim().is_empty() {
            return Err(RepoError::constraint("problem bank file name is empty"));
        }
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(RepoError::constraint(format!(
                "problem bank path escapes content root: {file}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ProblemBankRepo for FileProblemBank {
    async fn load(&self, file: &str) -> Result<ProblemBank, RepoError> {
        let path = self.resolve(file)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepoError::not_found("Problem bank", path.display()));
            }
            Err(e) => return Err(RepoError::database("load_problem_bank", e)),
        };

        let bank: ProblemBank = serde_json::from_str(&raw)
            .map_err(|e| RepoError::serialization(format!("{}: {e}", path.display())))?;
        tracing::debug!(file = %path.display(), problems = bank.len(), "Loaded problem bank");
        Ok(bank)
    }
}
