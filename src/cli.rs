//! CLI domain: parse, route and presentation only.
//! No domain orchestration; a single route table dispatches to the generation service.

mod parse;
mod presentation;
mod route;

pub use parse::{Cli, Commands};
pub use presentation::{
    format_generation_json, format_generation_text, format_node_json, format_node_text,
    GenerationReport,
};
pub use route::RunContext;

