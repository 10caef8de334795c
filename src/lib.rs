//! dynamic-dora-builder - compose dora deployments into a single dataflow
//!
//! A deployment document lists nodes and reusable components. The builder renders it,
//! expands the components, imports dynamic nodes from other dataflow documents and
//! writes one self-contained dataflow whose paths are relative to the invoking
//! directory.
//!
//! # Architecture Overview
//!
//! ```text
//! deployment.yml ──render──▶ Deployment ──expand──▶ node entries ──resolve──▶ Dataflow
//!                  (Tera)                (components)              (paths, dynamic nodes)
//! ```
//!
//! Data flows in one direction. Every document is rendered as a Tera template before it
//! is parsed, and the process environment is captured once per build.
//!
//! # Core Modules
//!
//! ## Pipeline
//! - [`builder`] - the orchestrator: render, expand, resolve, normalize, assemble
//! - [`document`] - resolve, read, render and parse documents
//! - [`deployment`] - typed deployment, component and node declarations
//! - [`resolver`] - path resolution, node classification, dynamic imports, components
//! - [`dataflow`] - the resolved output and its YAML export
//!
//! ## Supporting Modules
//! - [`templating`] - Tera rendering with strict variables and suggestions
//! - [`config`] - the captured build context
//! - [`core`] - error taxonomy and user-facing error display
//! - [`cli`] - the `build` command
//! - [`utils`] - lexical path handling and atomic writes
//!
//! # Deployment Format
//!
//! ```yaml
//! nodes:
//!   # explicit node
//!   - id: camera
//!     path: nodes
//!     env:
//!       DEVICE: {{ env.CAMERA_DEVICE | default(value="/dev/video0") }}
//!     operator:
//!       python: nodes/camera.py
//!       inputs:
//!         tick: dora/timer/millis/50
//!       outputs: [image]
//!
//!   # bare operator, known as `plot`
//!   - operator:
//!       python: nodes/plot.py
//!       inputs:
//!         image: camera/image
//!
//!   # imported from another dataflow
//!   - id: detector
//!     kind: dynamic
//!     path: ../vision/dataflow.yml
//!
//! components:
//!   - id: recorders
//!     path: components/recorder.yml.j2
//!     env:
//!       count: 2
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use dynamic_dora_builder::builder::DataflowBuilder;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let builder = DataflowBuilder::from_process()?;
//! let dataflow = builder.build_and_export(Path::new("deployment.yml"), None)?;
//! for id in dataflow.ids() {
//!     println!("{id}");
//! }
//! # Ok(())
//! # }
//! ```

// Pipeline
pub mod builder;
pub mod dataflow;
pub mod deployment;
pub mod document;
pub mod resolver;

// Supporting modules
pub mod cli;
pub mod config;
pub mod core;
pub mod templating;
pub mod utils;

// test_utils is available for tests and the integration test target
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
