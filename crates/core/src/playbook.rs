//! The playbook store: accumulated strategies shared across iterations.
//!
//! A playbook maps bullet ids to bullets. Bullets are only ever created by a
//! curator `ADD` operation (the store mints the id) and only ever mutated by
//! a reflector tag, which bumps exactly one of three counters. Nothing is
//! deleted or rewritten in place.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::debug;
use uuid::Uuid;

use crate::error::PlaybookError;

/// Section used when a curator leaves the section label blank.
pub const DEFAULT_SECTION: &str = "general";

/// Unique identifier of a playbook bullet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulletId(pub String);

impl BulletId {
    /// Mint a fresh, globally unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BulletId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for BulletId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for BulletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The reflector's verdict on a bullet the generator used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Helpful,
    Harmful,
    Neutral,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Helpful => "helpful",
            Tag::Harmful => "harmful",
            Tag::Neutral => "neutral",
        }
    }
}

/// Helpful / harmful / neutral tallies for one bullet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub helpful: u32,
    pub harmful: u32,
    pub neutral: u32,
}

impl Counter {
    /// Bump the tally for `tag` by one.
    pub fn increment(&mut self, tag: Tag) {
        match tag {
            Tag::Helpful => self.helpful += 1,
            Tag::Harmful => self.harmful += 1,
            Tag::Neutral => self.neutral += 1,
        }
    }
}

/// One playbook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub counter: Counter,
    pub content: String,
    #[serde(default = "default_section")]
    pub section: String,
}

fn default_section() -> String {
    DEFAULT_SECTION.into()
}

impl Bullet {
    /// A fresh bullet with zeroed counters.
    pub fn new(section: impl Into<String>, content: impl Into<String>) -> Self {
        let section = section.into();
        Self {
            counter: Counter::default(),
            content: content.into(),
            section: if section.trim().is_empty() {
                default_section()
            } else {
                section
            },
        }
    }
}

/// A `{bullet_id, tag}` pair emitted by the reflector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletTag {
    pub bullet_id: BulletId,
    pub tag: Tag,
}

/// An edit proposed by the curator.
///
/// Only `ADD` is acted upon. Any other `type` decodes to `Unsupported` so
/// newer curator vocabularies do not break older drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CuratorOperation {
    #[serde(rename = "ADD")]
    Add {
        #[serde(default)]
        section: String,
        content: String,
    },
    #[serde(other)]
    Unsupported,
}

/// The playbook store.
///
/// Bullets keep their insertion order so prompts render the same way every
/// time the playbook is shown to a role.
#[derive(Debug, Clone, Default)]
pub struct Playbook {
    bullets: HashMap<BulletId, Bullet>,
    order: Vec<BulletId>,
}

impl Playbook {
    /// Create an empty playbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a playbook with existing bullets. Later duplicates of an id win.
    pub fn from_bullets(bullets: impl IntoIterator<Item = (BulletId, Bullet)>) -> Self {
        let mut playbook = Self::new();
        for (id, bullet) in bullets {
            playbook.insert(id, bullet);
        }
        playbook
    }

    fn insert(&mut self, id: BulletId, bullet: Bullet) {
        if self.bullets.insert(id.clone(), bullet).is_none() {
            self.order.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    pub fn get(&self, id: &BulletId) -> Option<&Bullet> {
        self.bullets.get(id)
    }

    pub fn contains(&self, id: &BulletId) -> bool {
        self.bullets.contains_key(id)
    }

    /// Iterate bullets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BulletId, &Bullet)> {
        self.order
            .iter()
            .filter_map(|id| self.bullets.get(id).map(|b| (id, b)))
    }

    /// Increment one counter on one bullet.
    pub fn apply_tag(&mut self, id: &BulletId, tag: Tag) -> Result<(), PlaybookError> {
        let bullet = self
            .bullets
            .get_mut(id)
            .ok_or_else(|| PlaybookError::UnknownBullet(id.to_string()))?;
        bullet.counter.increment(tag);
        Ok(())
    }

    /// Apply a reflector's tag list.
    ///
    /// Every id is resolved before any counter moves, so an unknown id leaves
    /// the playbook untouched. Repeated pairs are cumulative.
    pub fn apply_tags(&mut self, tags: &[BulletTag]) -> Result<usize, PlaybookError> {
        if let Some(missing) = tags.iter().find(|t| !self.contains(&t.bullet_id)) {
            return Err(PlaybookError::UnknownBullet(missing.bullet_id.to_string()));
        }
        for t in tags {
            self.apply_tag(&t.bullet_id, t.tag)?;
        }
        Ok(tags.len())
    }

    /// Add one bullet under a freshly minted id.
    pub fn add(&mut self, section: impl Into<String>, content: impl Into<String>) -> BulletId {
        let mut id = BulletId::new();
        while self.contains(&id) {
            id = BulletId::new();
        }
        self.insert(id.clone(), Bullet::new(section, content));
        id
    }

    /// Merge curator operations, returning the ids of the bullets added.
    pub fn merge(&mut self, operations: &[CuratorOperation]) -> Vec<BulletId> {
        let mut added = Vec::new();
        for op in operations {
            match op {
                CuratorOperation::Add { section, content } => {
                    let id = self.add(section.as_str(), content.as_str());
                    debug!(bullet_id = %id, section = %section, "Added playbook bullet");
                    added.push(id);
                }
                CuratorOperation::Unsupported => {
                    debug!("Ignoring unsupported curator operation");
                }
            }
        }
        added
    }

    /// Render the playbook for inclusion in a prompt.
    ///
    /// Bullets are grouped by section (sections in first-seen order), one
    /// line each: `[id] helpful=n harmful=n neutral=n :: content`.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "(empty playbook)".into();
        }

        let mut sections: Vec<&str> = Vec::new();
        for (_, bullet) in self.iter() {
            if !sections.contains(&bullet.section.as_str()) {
                sections.push(&bullet.section);
            }
        }

        let mut out = String::new();
        for section in sections {
            let _ = writeln!(out, "## {section}");
            for (id, bullet) in self.iter().filter(|(_, b)| b.section == section) {
                let _ = writeln!(
                    out,
                    "[{id}] helpful={} harmful={} neutral={} :: {}",
                    bullet.counter.helpful, bullet.counter.harmful, bullet.counter.neutral, bullet.content
                );
            }
        }
        out.trim_end().to_string()
    }
}

impl Serialize for Playbook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, bullet) in self.iter() {
            map.serialize_entry(id, bullet)?;
        }
        map.end()
    }
}
