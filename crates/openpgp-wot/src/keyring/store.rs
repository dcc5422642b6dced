//! Keyring persistence.
//!
//! Stores `CertificateRecord`s as JSON files under a directory tree:
//!
//! ```text
//! {base_dir}/
//! ├── certs/            — one file per certificate
//! │   └── {fingerprint}.json
//! └── trust-root.json   — optional local trust root
//! ```
//!
//! File format:
//! ```json
//! { "version": 1, "certificate": { ... CertificateRecord ... } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};
use crate::synopsis::Fingerprint;

use super::record::CertificateRecord;

// ── File format constants ─────────────────────────────────────────────────────

const KEYRING_FILE_VERSION: u32 = 1;

const CERTS_DIR: &str = "certs";

/// File name (without extension) of the trust root.
pub const TRUST_ROOT_NAME: &str = "trust-root";

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct KeyringFile {
    version: u32,
    certificate: CertificateRecord,
}

/// What `import_file` accepts: a keyring file or a bare record.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Wrapped(KeyringFile),
    Bare(CertificateRecord),
}

// ── KeyringStore ──────────────────────────────────────────────────────────────

/// Filesystem-backed keyring.
pub struct KeyringStore {
    base_dir: PathBuf,
}

impl KeyringStore {
    /// Open the keyring rooted at `base_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `WotError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(CERTS_DIR))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Persist a certificate, replacing any stored copy.
    ///
    /// # Errors
    ///
    /// Returns `WotError::SerializationError` if serialization fails, or
    /// `WotError::Io` for filesystem errors.
    pub fn save(&self, certificate: &CertificateRecord) -> Result<()> {
        write_record(&self.cert_path(&certificate.fingerprint), certificate)
    }

    /// Load a certificate by fingerprint.
    ///
    /// # Errors
    ///
    /// Returns `WotError::NotFound` if it is not stored,
    /// `WotError::InvalidFileFormat` for malformed files, or `WotError::Io`.
    pub fn load(&self, fingerprint: &Fingerprint) -> Result<CertificateRecord> {
        let path = self.cert_path(fingerprint);
        if !path.exists() {
            return Err(WotError::NotFound(fingerprint.to_string()));
        }
        read_record(&path)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.cert_path(fingerprint).exists()
    }

    /// Fingerprints of all stored certificates, sorted.
    ///
    /// Files whose names are not fingerprints are ignored.
    ///
    /// # Errors
    ///
    /// Returns `WotError::Io` if the directory cannot be read.
    pub fn list_fingerprints(&self) -> Result<Vec<Fingerprint>> {
        let mut fingerprints = Vec::new();
        for entry in std::fs::read_dir(self.base_dir.join(CERTS_DIR))? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(".json") {
                match Fingerprint::new(stem) {
                    Ok(fpr) => fingerprints.push(fpr),
                    Err(_) => debug!("ignoring {}", entry.path().display()),
                }
            }
        }
        fingerprints.sort();
        Ok(fingerprints)
    }

    /// Every usable certificate in the keyring, including the trust root.
    ///
    /// Unreadable or invalid files are logged and skipped so that one bad
    /// file does not take the whole keyring down.
    ///
    /// # Errors
    ///
    /// Returns `WotError::Io` if the directory cannot be read.
    pub fn certificates(&self) -> Result<Vec<CertificateRecord>> {
        let mut certificates = BTreeMap::new();

        for fingerprint in self.list_fingerprints()? {
            match self.load(&fingerprint).and_then(|cert| {
                checked(cert).map_err(|e| {
                    WotError::InvalidFileFormat(format!("{}: {e}", fingerprint))
                })
            }) {
                Ok(cert) if cert.fingerprint != fingerprint => warn!(
                    "skipping {}: file holds {}",
                    fingerprint, cert.fingerprint
                ),
                Ok(cert) => {
                    certificates.insert(cert.fingerprint.clone(), cert);
                }
                Err(e) => warn!("skipping {}: {e}", fingerprint),
            }
        }

        match self.trust_root() {
            Ok(Some(root)) => {
                certificates.entry(root.fingerprint.clone()).or_insert(root);
            }
            Ok(None) => {}
            Err(e) => warn!("skipping trust root: {e}"),
        }

        debug!("loaded {} certificates from {}", certificates.len(), self.base_dir.display());
        Ok(certificates.into_values().collect())
    }

    // ── Trust root ────────────────────────────────────────────────────────────

    /// Store the local trust root.
    ///
    /// # Errors
    ///
    /// Returns `WotError::SerializationError` or `WotError::Io`.
    pub fn set_trust_root(&self, certificate: &CertificateRecord) -> Result<()> {
        write_record(&self.trust_root_path(), certificate)
    }

    /// The local trust root, if one is set.
    ///
    /// # Errors
    ///
    /// Returns `WotError::InvalidFileFormat` if the file is malformed or
    /// fails validation, or `WotError::Io`.
    pub fn trust_root(&self) -> Result<Option<CertificateRecord>> {
        let path = self.trust_root_path();
        if !path.exists() {
            return Ok(None);
        }
        let record = read_record(&path)?;
        checked(record).map(Some).map_err(|e| {
            WotError::InvalidFileFormat(format!("{}: {e}", path.display()))
        })
    }

    // ── Import ────────────────────────────────────────────────────────────────

    /// Import a certificate from a file and return its fingerprint.
    ///
    /// The file may be a keyring file or a bare certificate record. An
    /// already stored certificate is replaced.
    ///
    /// # Errors
    ///
    /// Returns `WotError::InvalidFileFormat` if the file cannot be parsed or
    /// the certificate fails validation, or `WotError::Io`.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<Fingerprint> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let parsed: ImportFile = serde_json::from_slice(&bytes).map_err(|e| {
            WotError::InvalidFileFormat(format!(
                "failed to parse certificate file {}: {e}",
                path.display()
            ))
        })?;
        let certificate = match parsed {
            ImportFile::Wrapped(file) => {
                check_version(file.version, path)?;
                file.certificate
            }
            ImportFile::Bare(certificate) => certificate,
        };
        let certificate = checked(certificate).map_err(|e| {
            WotError::InvalidFileFormat(format!("{}: {e}", path.display()))
        })?;

        self.save(&certificate)?;
        debug!("imported {} from {}", certificate.fingerprint, path.display());
        Ok(certificate.fingerprint)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn cert_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.base_dir
            .join(CERTS_DIR)
            .join(format!("{}.json", fingerprint.as_str()))
    }

    fn trust_root_path(&self) -> PathBuf {
        self.base_dir.join(format!("{TRUST_ROOT_NAME}.json"))
    }
}

fn checked(certificate: CertificateRecord) -> Result<CertificateRecord> {
    certificate.validate()?;
    Ok(certificate)
}

fn check_version(version: u32, path: &Path) -> Result<()> {
    if version != KEYRING_FILE_VERSION {
        return Err(WotError::InvalidFileFormat(format!(
            "unsupported version {version} in {}",
            path.display()
        )));
    }
    Ok(())
}

fn write_record(path: &Path, certificate: &CertificateRecord) -> Result<()> {
    let file = KeyringFile {
        version: KEYRING_FILE_VERSION,
        certificate: certificate.clone(),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| WotError::SerializationError(e.to_string()))?;
    std::fs::write(path, json.as_bytes())?;

    Ok(())
}

fn read_record(path: &Path) -> Result<CertificateRecord> {
    let bytes = std::fs::read(path)?;
    let file: KeyringFile = serde_json::from_slice(&bytes).map_err(|e| {
        WotError::InvalidFileFormat(format!(
            "failed to parse certificate file {}: {e}",
            path.display()
        ))
    })?;
    check_version(file.version, path)?;
    Ok(file.certificate)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
