//! Declarative stream topologies
//!
//! Entities (source topics, processing streams, sink topics) are registered
//! by id and connected by a workflow of directed edges. A topology can be
//! validated, compiled into running tasks over a [`transport::Transport`],
//! or dry-run synchronously against literal inputs.

pub mod app;
pub mod domain;
pub mod engine;
pub mod experiment;
pub mod graph;
pub mod io;
pub mod prelude;
pub mod transform;
pub mod transport;
