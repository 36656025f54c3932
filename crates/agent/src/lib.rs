//! The playbook loop: generator, reflector, curator.
//!
//! Each iteration runs a fixed sequence:
//!
//! 1. **Generate** an answer using the current playbook
//! 2. **Reflect** on it against the ground truth and tag the bullets used
//! 3. **Tag** the playbook (helpful / harmful / neutral counters)
//! 4. **Curate** new bullets from the reflection
//! 5. **Merge** the curator's additions into the playbook
//!
//! Every role talks to the LLM gateway through the same two-message request
//! shape and decodes the reply with [`parser::parse_response`].

pub mod driver;
pub mod parser;
pub mod roles;

pub use driver::{IterationReport, PlaybookLoop};
pub use parser::{parse_response, parse_value, strip_thinking, THINK_DELIMITER};
pub use roles::{
    Completion, Curator, CuratorOutput, Generator, GeneratorOutput, Reflector, ReflectorOutput,
    RoleClient, RoleOutput,
};

#[cfg(test)]
pub(crate) mod test_helpers;
