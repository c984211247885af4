use serde::{Deserialize, Serialize};

use crate::filter::parse_team_members;
use crate::output::RenderMode;

/// Optional defaults read from `config.yaml`. Command line flags win.
///
/// Example YAML:
/// ```yaml
/// team_members: [alice, bob]
/// human: true
/// endpoint: https://github.example.com/api
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Allowlist used when `--teamMembers` is not given
    #[serde(default)]
    pub team_members: Option<Vec<String>>,

    /// Render human readable values by default
    #[serde(default)]
    pub human: Option<bool>,

    /// GitHub API base URL
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    /// The team allowlist: the `--teamMembers` value when given, otherwise
    /// the configured list. Entries are normalized.
    pub fn team_allowlist(&self, flag: Option<&str>) -> Vec<String> {
        match flag {
            Some(raw) => parse_team_members(raw),
            None => self
                .team_members
                .iter()
                .flatten()
                .flat_map(|member| parse_team_members(member))
                .collect(),
        }
    }

    /// `--human` forces human rendering; otherwise the configured default.
    pub fn render_mode(&self, human_flag: bool) -> RenderMode {
        RenderMode::from_human_flag(human_flag || self.human.unwrap_or(false))
    }
}
