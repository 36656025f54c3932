//! # ACE Core
//!
//! Domain types, traits, and error definitions for the ACE playbook loop.
//! This crate has **no transport dependencies**: it defines the domain model
//! that the gateway, agent, and CLI crates implement against.
//!
//! The LLM boundary is the `Provider` trait; implementations live in
//! `ace-providers`. The playbook store lives here too: roles read it and only
//! the driver mutates it.

pub mod error;
pub mod event;
pub mod message;
pub mod playbook;
pub mod provider;
pub mod task;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ParseError, PlaybookError, ProviderError, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use playbook::{Bullet, BulletId, BulletTag, Counter, CuratorOperation, Playbook, Tag};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use task::{Task, TaskContext};
