//! Repository configuration
//!
//! A small section-keyed text format:
//!
//! ```text
//! [core]
//! 	repositoryformatversion = 0
//! 	filemode = false
//! 	bare = false
//! ```
//!
//! Sections and keys keep their file order so that a load/save cycle does not
//! reshuffle a user's file.

use crate::errors::{Error, Result};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Config {
    /// Configuration written into every new repository
    pub fn defaults() -> Self {
        let mut config = Config::default();
        config.set("core", "repositoryformatversion", "0");
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");
        config
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Config::default();
        let mut current_section: Option<String> = None;

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::Config {
                        line: index + 1,
                        reason: "empty section name".to_string(),
                    });
                }
                config.section_mut(name);
                current_section = Some(name.to_string());
                continue;
            }

            let section = current_section.as_deref().ok_or_else(|| Error::Config {
                line: index + 1,
                reason: "key outside of any section".to_string(),
            })?;
            let (key, value) = line.split_once('=').ok_or_else(|| Error::Config {
                line: index + 1,
                reason: format!("expected 'key = value', found '{line}'"),
            })?;

            config.set(section, key.trim(), value.trim());
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get(section, key)?.parse().ok()
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get(section, key)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    /// Insert or replace a value
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let section = self.section_mut(section);

        match section.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => section.entries.push((key.to_string(), value.to_string())),
        }
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let position = match self.sections.iter().position(|s| s.name == name) {
            Some(position) => position,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };

        &mut self.sections[position]
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "\t{key} = {value}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_render_like_git() {
        assert_eq!(
            Config::defaults().to_string(),
            "[core]\n\trepositoryformatversion = 0\n\tfilemode = false\n\tbare = false\n"
        );
    }

    #[test]
    fn parse_reads_what_display_writes() {
        let config = Config::defaults();
        assert_eq!(Config::parse(&config.to_string()).unwrap(), config);
    }

    #[test]
    fn typed_getters() {
        let config = Config::parse(
            "# comment\n[core]\nrepositoryformatversion=0\nbare = TRUE\n[user]\nname = Someone\n",
        )
        .unwrap();

        assert_eq!(config.get_int("core", "repositoryformatversion"), Some(0));
        assert_eq!(config.get_bool("core", "bare"), Some(true));
        assert_eq!(config.get("user", "name"), Some("Someone"));
        assert_eq!(config.get("user", "email"), None);
        assert_eq!(config.get("remote", "url"), None);
    }

    #[test]
    fn key_outside_section_is_rejected() {
        let result = Config::parse("bare = false\n");
        assert!(matches!(result, Err(Error::Config { line: 1, .. })));
    }

    #[test]
    fn line_without_equals_is_rejected() {
        let result = Config::parse("[core]\n\nbare\n");
        assert!(matches!(result, Err(Error::Config { line: 3, .. })));
    }

    #[test]
    fn load_and_save_through_the_filesystem() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("config");

        let mut config = Config::defaults();
        config.set("core", "filemode", "true");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.get_bool("core", "filemode"), Some(true));
        assert_eq!(loaded, config);
    }
}
