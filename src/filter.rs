use crate::model::{Issue, PullRequest};

/// Logins of automation accounts whose activity is excluded from every report.
pub const BOT_AUTHORS: &[&str] = &[
    "dependabot",
    "dependabot[bot]",
    "github-actions",
    "github-actions[bot]",
    "renovate",
    "renovate[bot]",
];

/// Whether `author` belongs to the team allowlist.
///
/// An empty allowlist disables filtering: everyone (including bots and
/// unknown authors) counts as a team member. Otherwise an absent author is
/// never a member, and a present one matches case-insensitively after
/// trimming.
pub fn is_team_member(members: &[String], author: Option<&str>) -> bool {
    if members.is_empty() {
        return true;
    }
    let Some(author) = author else {
        return false;
    };
    let author = author.trim();
    members
        .iter()
        .any(|member| member.trim().eq_ignore_ascii_case(author))
}

/// Whether `author` is an automation account. An absent author is treated as
/// one: the account is deleted or is an app.
pub fn is_bot(author: Option<&str>) -> bool {
    match author {
        None => true,
        Some(login) => BOT_AUTHORS.contains(&login),
    }
}

/// Parse a comma separated allowlist ("alice, Bob,,carol") into normalized
/// lowercase logins, dropping empty entries.
pub fn parse_team_members(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|member| member.trim().to_lowercase())
        .filter(|member| !member.is_empty())
        .collect()
}

/// Something with an author that bot filtering applies to.
pub trait Authored {
    fn author(&self) -> Option<&str>;
}

impl Authored for PullRequest {
    fn author(&self) -> Option<&str> {
        PullRequest::author(self)
    }
}

impl Authored for Issue {
    fn author(&self) -> Option<&str> {
        Issue::author(self)
    }
}

/// Drop items authored by bots, keeping the rest in order.
pub fn without_bots<T: Authored>(items: &[T]) -> Vec<&T> {
    items.iter().filter(|item| !is_bot(item.author())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueRecord, PullRequestRecord};
    use chrono::{TimeZone, Utc};

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_empty_allowlist_accepts_everyone() {
        assert!(is_team_member(&[], Some("alice")));
        assert!(is_team_member(&[], Some("dependabot")));
        assert!(is_team_member(&[], None));
    }

    #[test]
    fn test_team_member_case_and_whitespace_insensitive() {
        let team = members(&["alice"]);
        assert!(is_team_member(&team, Some("Alice ")));
        assert!(is_team_member(&team, Some("  ALICE")));
        assert!(!is_team_member(&team, Some("alicia")));
    }

    #[test]
    fn test_absent_author_is_not_a_member() {
        assert!(!is_team_member(&members(&["alice"]), None));
    }

    #[test]
    fn test_members_are_normalized_too() {
        assert!(is_team_member(&members(&[" Bob "]), Some("bob")));
    }

    #[test]
    fn test_is_bot() {
        assert!(is_bot(None));
        assert!(is_bot(Some("dependabot")));
        assert!(is_bot(Some("renovate[bot]")));
        assert!(is_bot(Some("github-actions")));
        assert!(!is_bot(Some("alice")));
    }

    #[test]
    fn test_parse_team_members() {
        assert_eq!(
            parse_team_members("Alice, bob,,  Carol "),
            vec!["alice", "bob", "carol"]
        );
        assert!(parse_team_members("").is_empty());
    }

    #[test]
    fn test_without_bots() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let issue = |author: Option<&str>| {
            Issue::new(IssueRecord {
                title: "t".to_string(),
                author: author.map(str::to_string),
                url: "u".to_string(),
                created_at: created,
                closed_at: None,
                comments: vec![],
            })
        };
        let issues = vec![issue(Some("alice")), issue(None), issue(Some("dependabot"))];
        let kept = without_bots(&issues);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].author(), Some("alice"));

        let pr = PullRequest::new(
            PullRequestRecord {
                title: "t".to_string(),
                author: Some("renovate".to_string()),
                url: "u".to_string(),
                created_at: created,
                merged_at: None,
                additions: 0,
                deletions: 0,
                authored_date: created,
                reviews: vec![],
            },
            created,
        );
        assert!(without_bots(&[pr]).is_empty());
    }
}
