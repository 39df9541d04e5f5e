// src/config/sections.rs
//! Static section → source table.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SECTIONS_PATH: &str = "DIGEST_SECTIONS_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    pub sources: Vec<String>,
}

impl SectionConfig {
    pub fn new(name: &str, sources: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Sections used when no config file is present.
pub fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("Deals", &["StealsNotDeals", "frugalmalefashion"]),
        SectionConfig::new(
            "Tech",
            &[
                "artificial",
                "ProductManagement",
                "programming",
                "ClaudeAI",
                "OpenAI",
            ],
        ),
        SectionConfig::new("Finance", &["investing", "FinancialPlanning"]),
    ]
}

/// Load sections from an explicit path. Supports TOML or JSON formats.
pub fn load_sections_from(path: &Path) -> Result<Vec<SectionConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sections from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sections(&content, ext.as_str())
}

/// Load sections using env var + fallbacks:
/// 1) $DIGEST_SECTIONS_PATH
/// 2) config/sections.toml
/// 3) config/sections.json
/// 4) built-in defaults
pub fn load_sections_default() -> Result<Vec<SectionConfig>> {
    if let Ok(p) = std::env::var(ENV_SECTIONS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sections_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SECTIONS_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sections.toml");
    if toml_p.exists() {
        return load_sections_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sections.json");
    if json_p.exists() {
        return load_sections_from(&json_p);
    }
    Ok(default_sections())
}

fn parse_sections(s: &str, hint_ext: &str) -> Result<Vec<SectionConfig>> {
    match hint_ext {
        "toml" => parse_toml(s),
        "json" => parse_json(s),
        _ => parse_toml(s)
            .or_else(|_| parse_json(s))
            .map_err(|_| anyhow!("unsupported sections format")),
    }
}

fn parse_toml(s: &str) -> Result<Vec<SectionConfig>> {
    #[derive(Deserialize)]
    struct TomlSections {
        sections: Vec<SectionConfig>,
    }
    let v: TomlSections = toml::from_str(s).context("parsing sections toml")?;
    Ok(clean_sections(v.sections))
}

fn parse_json(s: &str) -> Result<Vec<SectionConfig>> {
    let v: Vec<SectionConfig> = serde_json::from_str(s).context("parsing sections json")?;
    Ok(clean_sections(v))
}

/// Trim names, drop blank and repeated sources (first wins, order kept),
/// drop sections left without sources.
fn clean_sections(items: Vec<SectionConfig>) -> Vec<SectionConfig> {
    items
        .into_iter()
        .filter_map(|sec| {
            let mut sources: Vec<String> = Vec::with_capacity(sec.sources.len());
            for src in sec.sources {
                let t = src.trim().trim_start_matches("r/");
                if !t.is_empty() && !sources.iter().any(|s| s.eq_ignore_ascii_case(t)) {
                    sources.push(t.to_string());
                }
            }
            if sources.is_empty() {
                return None;
            }
            Some(SectionConfig {
                name: sec.name.trim().to_string(),
                sources,
            })
        })
        .collect()
}
