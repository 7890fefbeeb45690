//! JSON persistence of built QUBO models.
//!
//! An artifact is self-contained: it carries the builder params, the variable
//! table (with the batch inputs) and the matrix, so it can be reloaded to
//! solve or decode without rebuilding. A SHA-256 fingerprint over the body is
//! checked on load.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::qubo::{BuilderParams, QuboMatrix, QuboModel, ScaleReport, VariableTable};

pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub enum ArtifactError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Stored fingerprint does not match the content.
    Fingerprint { expected: String, actual: String },
    /// Content parsed but is not a usable model.
    Schema(String),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactError::Io(err) => write!(f, "artifact i/o failed: {}", err),
            ArtifactError::Json(err) => write!(f, "artifact json invalid: {}", err),
            ArtifactError::Fingerprint { expected, actual } => write!(
                f,
                "artifact fingerprint mismatch: stored {}, computed {}",
                expected, actual
            ),
            ArtifactError::Schema(message) => write!(f, "artifact schema invalid: {}", message),
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::Io(err) => Some(err),
            ArtifactError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(err: std::io::Error) -> Self {
        ArtifactError::Io(err)
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(err: serde_json::Error) -> Self {
        ArtifactError::Json(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuboArtifact {
    pub schema_version: u32,
    pub fingerprint: String,
    pub params: BuilderParams,
    pub variables: VariableTable,
    pub matrix: QuboMatrix,
    pub scale: ScaleReport,
}

/// Fingerprinted part of the artifact.
#[derive(Serialize)]
struct ArtifactBody<'a> {
    schema_version: u32,
    params: &'a BuilderParams,
    variables: &'a VariableTable,
    matrix: &'a QuboMatrix,
    scale: &'a ScaleReport,
}

fn body_fingerprint(body: &ArtifactBody<'_>) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(body)?);
    Ok(format!("{:x}", hasher.finalize()))
}

impl QuboArtifact {
    pub fn from_model(model: &QuboModel) -> Result<Self, ArtifactError> {
        let fingerprint = body_fingerprint(&ArtifactBody {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            params: &model.params,
            variables: &model.variables,
            matrix: &model.matrix,
            scale: &model.scale,
        })?;
        Ok(Self {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            fingerprint,
            params: model.params.clone(),
            variables: model.variables.clone(),
            matrix: model.matrix.clone(),
            scale: model.scale,
        })
    }

    pub fn compute_fingerprint(&self) -> Result<String, ArtifactError> {
        Ok(body_fingerprint(&ArtifactBody {
            schema_version: self.schema_version,
            params: &self.params,
            variables: &self.variables,
            matrix: &self.matrix,
            scale: &self.scale,
        })?)
    }

    /// Checks schema version, matrix shape and fingerprint.
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if self.schema_version != ARTIFACT_SCHEMA_VERSION {
            return Err(ArtifactError::Schema(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }
        if self.matrix.num_variables() != self.variables.len() {
            return Err(ArtifactError::Schema(format!(
                "matrix has {} variables, table has {}",
                self.matrix.num_variables(),
                self.variables.len()
            )));
        }
        if !self.matrix.is_well_formed() {
            return Err(ArtifactError::Schema(
                "matrix terms must be upper-triangular and in range".to_string(),
            ));
        }
        let actual = self.compute_fingerprint()?;
        if actual != self.fingerprint {
            return Err(ArtifactError::Fingerprint {
                expected: self.fingerprint.clone(),
                actual,
            });
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        tracing::debug!(path = %path.as_ref().display(), "saved QUBO artifact");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let artifact: QuboArtifact = serde_json::from_reader(reader)?;
        artifact.verify()?;
        Ok(artifact)
    }

    pub fn into_model(self) -> QuboModel {
        QuboModel {
            variables: self.variables,
            matrix: self.matrix,
            scale: self.scale,
            params: self.params,
        }
    }
}
