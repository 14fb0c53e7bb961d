//! CLI support.
//!
//! The binary stands in for the host application: a directory is the vault,
//! `--active` names the open note, `--selection` is the selected text and
//! the terminal is the display.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `trigger` | Run one association or guess |
//! | `sample` | Print a candidate subset without calling the service |
//! | `config` | Show or edit the persisted settings |

mod config;
mod display;
mod llm_factory;

pub use config::render_config;
pub use display::{TerminalDisplay, render_payload};
pub use llm_factory::{build_http_config, build_openai_client};
