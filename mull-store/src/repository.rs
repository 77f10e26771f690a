//! Matter repository
//!
//! One file per matter, named `<id>-<slug>.<ext>`. There is no index:
//! every lookup scans the directory for the `<id>-` prefix, so reads always
//! reflect what is on disk.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::backend::{Backend, FsBackend};
use crate::codec::{self, DecodeError};
use crate::config::StoreConfig;
use crate::docket::Docket;
use crate::error::{Result, StoreError};
use crate::matter::{today, Matter, MatterMeta, MetaValue};
use crate::search::MatterFilter;

/// Matter store over a [`Backend`]
pub struct MatterStore {
    config: StoreConfig,
    backend: Box<dyn Backend>,
}

/// Matter counts for one epic label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpicSummary {
    pub name: String,
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl MatterStore {
    /// Open the store described by `config`, creating its directories
    pub fn open(config: StoreConfig) -> Result<Self> {
        let backend = FsBackend::open(config.matters_path())?;
        log::info!("MatterStore opened at: {}", config.root.display());
        Ok(Self::with_backend(config, backend))
    }

    /// Use a custom backend for matter files. The docket still lives at
    /// `config.docket_path()`.
    pub fn with_backend(config: StoreConfig, backend: impl Backend + 'static) -> Self {
        Self {
            config,
            backend: Box::new(backend),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The docket stored beside this repository
    pub fn docket(&self) -> Docket {
        Docket::new(self.config.docket_path())
    }

    /// Derive a fresh identifier from `title` and the current time.
    ///
    /// Candidates that collide with a stored matter are retried with the
    /// timestamp nudged forward one nanosecond at a time.
    pub fn generate_id(&self, title: &str) -> Result<String> {
        self.generate_id_at(title, Utc::now())
    }

    fn generate_id_at(&self, title: &str, now: DateTime<Utc>) -> Result<String> {
        let taken = self.ids()?;
        let width = self.config.id_width.clamp(1, 64);
        for attempt in 0..self.config.max_id_attempts {
            let stamp = (now + Duration::nanoseconds(attempt as i64))
                .to_rfc3339_opts(SecondsFormat::Nanos, true);
            let digest = Sha256::digest(format!("{title}{stamp}").as_bytes());
            let mut id = hex::encode(&digest[..width.div_ceil(2)]);
            id.truncate(width);
            if !taken.contains(&id) {
                return Ok(id);
            }
            log::debug!("identifier {} already taken, retrying", id);
        }
        Err(StoreError::IdExhausted(self.config.max_id_attempts))
    }

    /// Create and persist a new matter
    pub fn create(&self, title: &str, meta: &MatterMeta) -> Result<Matter> {
        let id = self.generate_id(title)?;
        let today = today();

        let mut matter = Matter {
            filename: self.filename_for(&id, title),
            id,
            title: title.to_string(),
            created: Some(today.into()),
            updated: Some(today.into()),
            ..Default::default()
        };
        for (key, value) in meta.iter() {
            matter.apply_meta(key, value)?;
        }

        self.write(&matter)?;
        log::debug!("created matter {} ({})", matter.id, matter.filename);
        Ok(matter)
    }

    /// Read a matter by identifier
    pub fn get(&self, id: &str) -> Result<Matter> {
        let filename = self.find_file(id)?;
        self.read_file(&filename)
    }

    /// The matter's file exactly as stored
    pub fn read_raw(&self, id: &str) -> Result<String> {
        let filename = self.find_file(id)?;
        self.read_text(&filename)
    }

    /// All decodable matters matching `filter`, in file name order.
    /// Files that fail to decode are skipped.
    pub fn list(&self, filter: &MatterFilter) -> Result<Vec<Matter>> {
        let mut matters = Vec::new();
        for filename in self.matter_files()? {
            match self.read_file(&filename) {
                Ok(matter) if filter.matches(&matter) => matters.push(matter),
                Ok(_) => {}
                Err(e) => log::warn!("skipping {}: {}", filename, e),
            }
        }
        Ok(matters)
    }

    /// Every stored identifier, whether or not its file decodes
    pub fn ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .matter_files()?
            .iter()
            .map(|name| id_from_filename(name, &self.config.extension).to_string())
            .collect())
    }

    /// True when a file exists for `id`
    pub fn exists(&self, id: &str) -> Result<bool> {
        match self.find_file(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Set one metadata key through the same validation as [`Self::create`]
    pub fn update(&self, id: &str, key: &str, value: &str) -> Result<Matter> {
        let mut matter = self.get(id)?;
        matter.apply_meta(key, &MetaValue::from(value))?;
        matter.touch();
        self.write(&matter)?;
        Ok(matter)
    }

    /// Append text to the body, separated by a blank line
    pub fn append_body(&self, id: &str, text: &str) -> Result<Matter> {
        let mut matter = self.get(id)?;
        if matter.body.is_empty() {
            matter.body = text.to_string();
        } else {
            matter.body = format!("{}\n\n{}", matter.body, text);
        }
        matter.touch();
        self.write(&matter)?;
        Ok(matter)
    }

    /// Remove the matter's file. References held by other matters are
    /// left alone; see [`Self::remove_all_references`].
    pub fn delete(&self, id: &str) -> Result<()> {
        let filename = self.find_file(id)?;
        self.backend.remove(&filename)?;
        Ok(())
    }

    /// Encode and overwrite the matter's file
    pub fn write(&self, matter: &Matter) -> Result<()> {
        let filename = if matter.filename.is_empty() {
            self.filename_for(&matter.id, &matter.title)
        } else {
            matter.filename.clone()
        };
        self.backend
            .write(&filename, codec::encode(matter).as_bytes())?;
        Ok(())
    }

    /// Matter counts per epic label, sorted by name
    pub fn epics(&self, include_terminal: bool) -> Result<Vec<EpicSummary>> {
        let mut epics: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for matter in self.list(&MatterFilter::default())? {
            let Some(epic) = matter.epic.as_ref() else {
                continue;
            };
            if !include_terminal && matter.is_terminal() {
                continue;
            }
            *epics
                .entry(epic.clone())
                .or_default()
                .entry(matter.status.to_string())
                .or_insert(0) += 1;
        }

        Ok(epics
            .into_iter()
            .map(|(name, counts)| EpicSummary {
                total: counts.values().sum(),
                name,
                counts,
            })
            .collect())
    }

    pub(crate) fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Locate `<id>-*.<ext>` by linear scan
    pub(crate) fn find_file(&self, id: &str) -> Result<String> {
        let prefix = format!("{id}-");
        self.matter_files()?
            .into_iter()
            .find(|name| name.starts_with(&prefix))
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn matter_files(&self) -> Result<Vec<String>> {
        let suffix = format!(".{}", self.config.extension);
        Ok(self
            .backend
            .list()?
            .into_iter()
            .filter(|name| name.ends_with(&suffix))
            .collect())
    }

    fn read_file(&self, filename: &str) -> Result<Matter> {
        let text = self.read_text(filename)?;
        let mut matter =
            codec::decode(&text).map_err(|e| StoreError::decode(filename, e))?;
        matter.id = id_from_filename(filename, &self.config.extension).to_string();
        matter.filename = filename.to_string();
        Ok(matter)
    }

    /// File contents as text; bytes that are not UTF-8 are a decode error
    /// rather than being replaced, so a later write cannot alter them
    fn read_text(&self, filename: &str) -> Result<String> {
        let bytes = self.backend.read(filename)?;
        String::from_utf8(bytes)
            .map_err(|e| StoreError::decode(filename, DecodeError::from(e.utf8_error())))
    }

    fn filename_for(&self, id: &str, title: &str) -> String {
        let slug = slugify(title);
        if slug.is_empty() {
            format!("{id}-.{}", self.config.extension)
        } else {
            format!("{id}-{slug}.{}", self.config.extension)
        }
    }
}

/// Lower-case the title, turn every run of non-alphanumerics into a single
/// `-` and trim hyphens from both ends
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Identifier part of a matter file name
fn id_from_filename<'a>(filename: &'a str, extension: &str) -> &'a str {
    match filename.split_once('-') {
        Some((id, _)) => id,
        None => filename
            .strip_suffix(extension)
            .and_then(|stem| stem.strip_suffix('.'))
            .unwrap_or(filename),
    }
}
